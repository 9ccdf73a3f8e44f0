use parking_lot::Mutex;

pub trait Recyclable {
    fn new() -> Self;
    fn reset(&mut self);
}

impl Recyclable for Vec<u8> {
    fn new() -> Self {
        Vec::new()
    }

    fn reset(&mut self) {
        self.clear();
    }
}

/// A bounded free list of reusable items
#[derive(Debug)]
pub struct Pool<T> {
    items: Mutex<Vec<T>>,
    capacity: usize,
}

impl<T: Recyclable> Pool<T> {
    /// A pool keeping at most `capacity` items around
    pub fn new(capacity: usize) -> Self {
        Self {
            items: Mutex::new(Vec::with_capacity(capacity)),
            capacity,
        }
    }

    /// Take an item from the pool, or make a new one if it is empty
    pub fn detached(&self) -> T {
        self.items.lock().pop().unwrap_or_else(T::new)
    }

    /// Give an item back, dropping it if the pool is full
    pub fn recycle(&self, mut item: T) {
        let mut items = self.items.lock();
        if items.len() < self.capacity {
            item.reset();
            items.push(item);
        }
    }

    /// Number of items currently waiting for reuse
    pub fn len(&self) -> usize {
        self.items.lock().len()
    }
}
