//- skip_list
//- --
//- An ordered map from byte-string keys to values, built as a probabilistic skip list.

//- A skip list keeps its elements in one sorted linked list, and then adds sparser "fast lanes"
//- above it. Each element is linked into the bottom lane and into a random number of lanes above.
//- A search starts in the sparsest lane, runs forward until the next key would overshoot, drops
//- one lane, and repeats. With geometric heights the expected cost of search, insert and delete
//- is `O(log(N))`, and nothing ever has to be rebalanced.
//-
//- This is the shape of the in-memory tables found inside LSM storage engines, such as the
//- memtables of [LevelDB](https://github.com/google/leveldb) and [RocksDB](https://rocksdb.org/).
//=

//- Type Definitions
//- ==
//=
//- `fmt` backs the layout dump at the end of the file. `rand` supplies the random source that
//- decides element heights, and `tracing` logs structural changes at trace level.
use std::fmt;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tracing::{debug, trace};

use crate::config::SkipListConfig;
use crate::error::Result;
use crate::level::LevelGenerator;

//- Elements live in a `Vec` of slots and refer to each other by index, the way an arena would.
//- That sidesteps the borrow checker trouble of one element being pointed at from several
//- lanes at once. A link is simply the index of the next element, or `None` at the end of a lane.
//- Removing an element empties its slot, and the slot index goes on a free list for reuse.
type Link = Option<usize>;

//- The header and the elements are different kinds of node: the header has no key or value and
//- always spans every level. What they share is the ability to hold a forward link per level, so
//- that is a small trait rather than a common base type.
trait Forward {
    fn height(&self) -> usize;
    fn next_at(&self, level: usize) -> Link;
    fn set_next_at(&mut self, level: usize, link: Link);
}

struct Header {
    links: Vec<Link>,
}

impl Forward for Header {
    fn height(&self) -> usize {
        self.links.len()
    }

    fn next_at(&self, level: usize) -> Link {
        self.links[level]
    }

    fn set_next_at(&mut self, level: usize, link: Link) {
        self.links[level] = link;
    }
}

//- An `Element` holds its key, its value, and one link per level it stands in. The number of
//- links is its height and never changes. Once removed from a list the element is handed back to
//- the caller with its links cleared.
pub struct Element<V> {
    key: Vec<u8>,
    value: V,
    links: Vec<Link>,
}

impl<V> Forward for Element<V> {
    fn height(&self) -> usize {
        self.links.len()
    }

    fn next_at(&self, level: usize) -> Link {
        self.links[level]
    }

    fn set_next_at(&mut self, level: usize, link: Link) {
        self.links[level] = link;
    }
}

impl<V> Element<V> {
    pub fn key(&self) -> &[u8] {
        &self.key
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn height(&self) -> usize {
        self.links.len()
    }

    pub fn into_value(self) -> V {
        self.value
    }

    pub fn into_parts(self) -> (Vec<u8>, V) {
        (self.key, self.value)
    }
}

impl<V: fmt::Debug> fmt::Debug for Element<V> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Element")
            .field("key", &self.key.escape_ascii().to_string())
            .field("value", &self.value)
            .field("height", &self.height())
            .finish()
    }
}

//- A traversal is always standing on some node: either the header or an element slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    Header,
    Element(usize),
}

//- The `SkipList` owns the header, every linked element, and the level generator. It also keeps a
//- scratch buffer with one `Position` per level. Inserts and removals record the node just before
//- the target key at each level there, so no mutation allocates a fresh buffer. The list does no
//- locking of its own. Sharing one between threads means wrapping every call in a mutex.
pub struct SkipList<V, R = StdRng> {
    header: Header,
    slots: Vec<Option<Element<V>>>,
    free: Vec<usize>,
    levels: LevelGenerator<R>,
    probability: f64,
    len: usize,
    prevs: Vec<Position>,
}

//- Construction
//- ==
//=
//- The plain constructors use the default 18 levels with `p = 1/e`. `new` seeds from the
//- operating system, while `with_seed` gives a reproducible list. `with_rng` takes any
//- configuration and any random source, and rejects a configuration that cannot work.
impl<V> SkipList<V> {
    pub fn new() -> Self {
        Self::from_parts(SkipListConfig::default(), StdRng::from_os_rng())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::from_parts(SkipListConfig::default(), StdRng::seed_from_u64(seed))
    }
}

impl<V> Default for SkipList<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, R: RngCore> SkipList<V, R> {
    pub fn with_rng(config: SkipListConfig, rng: R) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_parts(config, rng))
    }

    fn from_parts(config: SkipListConfig, rng: R) -> Self {
        debug!(
            max_level = config.max_level,
            probability = config.probability,
            "creating skip list"
        );
        Self {
            header: Header {
                links: vec![None; config.max_level],
            },
            slots: Vec::new(),
            free: Vec::new(),
            levels: LevelGenerator::new(&config, rng),
            probability: config.probability,
            len: 0,
            prevs: vec![Position::Header; config.max_level],
        }
    }

//- Insertion
//- ==
//=
//- `put` is an upsert. The descent fills the scratch buffer with the last node before `key` on
//- every level. If the bottom-lane successor of that node already carries `key`, only its value
//- is replaced: no links move and the length stays the same.
//-
//- Otherwise a fresh element gets a random height `h`. On each level below `h` it takes over its
//- predecessor's forward link, and the predecessor is pointed at the new element. Lanes at or
//- above `h` never see it.
    pub fn put(&mut self, key: impl Into<Vec<u8>>, value: V) -> Entry<'_, V, R> {
        let key = key.into();
        let candidate = self.fill_predecessors(&key);

        if let Some(idx) = candidate.filter(|&idx| self.element(idx).key == key) {
            trace!(key_len = key.len(), "updating value in place");
            self.element_mut(idx).value = value;
            return Entry { list: self, idx };
        }

        let height = self.levels.random_level();
        let mut element = Element {
            key,
            value,
            links: vec![None; height],
        };
        for level in 0..height {
            element.links[level] = self.next_at(self.prevs[level], level);
        }
        trace!(key_len = element.key.len(), height, "linking new element");

        let idx = self.store(element);
        for level in 0..height {
            let prev = self.prevs[level];
            self.set_next_at(prev, level, Some(idx));
        }
        self.len += 1;

        Entry { list: self, idx }
    }
}

impl<V, R> SkipList<V, R> {
//- Search
//- ==
//=
//- Every operation shares one descent. It starts at the header on the top level and follows links
//- while the next key is strictly less than `key`. When the next key would reach or pass `key`, it
//- drops one level without going back to the header. The `visit` callback sees the node where
//- each level stopped, which is exactly the predecessor an insert or removal needs. After level
//- `0` the returned link is the first element whose key is `>= key`, if there is one.
    fn descend(&self, key: &[u8], mut visit: impl FnMut(usize, Position)) -> Link {
        let mut prev = Position::Header;
        let mut next = None;
        for level in (0..self.max_level()).rev() {
            next = self.next_at(prev, level);
            while let Some(idx) = next {
                let element = self.element(idx);
                if element.key.as_slice() >= key {
                    break;
                }
                prev = Position::Element(idx);
                next = element.next_at(level);
            }
            visit(level, prev);
        }
        next
    }

//- The descent only ever stops on a key that is `>=` the target, so an equal key is a hit and
//- anything else is a miss.
    fn find(&self, key: &[u8]) -> Link {
        self.descend(key, |_, _| {}).filter(|&idx| self.matches(idx, key))
    }

    fn matches(&self, idx: usize, key: &[u8]) -> bool {
        let candidate = self.element(idx).key.as_slice();
        debug_assert!(candidate >= key);
        candidate == key
    }

//- Mutations run the same descent but record each level's stopping point in the scratch buffer.
//- The buffer is moved out for the duration of the walk and put back, which costs no allocation.
    fn fill_predecessors(&mut self, key: &[u8]) -> Link {
        let mut prevs = std::mem::take(&mut self.prevs);
        let candidate = self.descend(key, |level, prev| prevs[level] = prev);
        self.prevs = prevs;
        candidate
    }

    pub fn get(&self, key: &[u8]) -> Option<Entry<'_, V, R>> {
        self.find(key).map(|idx| Entry { list: self, idx })
    }

    pub fn get_mut(&mut self, key: &[u8]) -> Option<&mut V> {
        let idx = self.find(key)?;
        Some(&mut self.element_mut(idx).value)
    }

    pub fn exists(&self, key: &[u8]) -> bool {
        self.find(key).is_some()
    }

//- Removal
//- ==
//=
//- Removing mirrors insertion. After the descent, each predecessor below the element's height
//- takes over the element's own forward link, so every lane skips it. Lanes above its height
//- never linked it and are left alone. The slot is emptied only once no link points at it.
    pub fn remove(&mut self, key: &[u8]) -> Option<Element<V>> {
        let idx = self
            .fill_predecessors(key)
            .filter(|&idx| self.matches(idx, key))?;

        for level in 0..self.element(idx).height() {
            let prev = self.prevs[level];
            let link = self.element(idx).next_at(level);
            self.set_next_at(prev, level, link);
        }
        self.len -= 1;

        let mut element = self.release(idx);
        element.links.fill(None);
        trace!(key_len = element.key.len(), height = element.height(), "unlinked element");
        Some(element)
    }

    pub fn clear(&mut self) {
        self.header.links.fill(None);
        self.slots.clear();
        self.free.clear();
        self.len = 0;
    }

//- Iteration and Accessors
//- ==
//=
//- The bottom lane holds every element in ascending key order, so walking it from the header is
//- a full sorted scan. `front` starts a walk, `Entry::next` takes one step.
    pub fn front(&self) -> Option<Entry<'_, V, R>> {
        self.header.next_at(0).map(|idx| Entry { list: self, idx })
    }

    pub fn iter(&self) -> Iter<'_, V, R> {
        Iter {
            list: self,
            next: self.header.next_at(0),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn max_level(&self) -> usize {
        self.header.height()
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }

//- Every link the list hands out points at an occupied slot: a slot is only emptied after the
//- last link to it is rewritten. Finding an empty slot here means that invariant was broken.
    fn element(&self, idx: usize) -> &Element<V> {
        match &self.slots[idx] {
            Some(element) => element,
            None => unreachable!("link to vacant slot {idx}"),
        }
    }

    fn element_mut(&mut self, idx: usize) -> &mut Element<V> {
        match &mut self.slots[idx] {
            Some(element) => element,
            None => unreachable!("link to vacant slot {idx}"),
        }
    }

    fn next_at(&self, position: Position, level: usize) -> Link {
        match position {
            Position::Header => self.header.next_at(level),
            Position::Element(idx) => self.element(idx).next_at(level),
        }
    }

    fn set_next_at(&mut self, position: Position, level: usize, link: Link) {
        match position {
            Position::Header => self.header.set_next_at(level, link),
            Position::Element(idx) => self.element_mut(idx).set_next_at(level, link),
        }
    }

    fn store(&mut self, element: Element<V>) -> usize {
        match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(element);
                idx
            }
            None => {
                self.slots.push(Some(element));
                self.slots.len() - 1
            }
        }
    }

    fn release(&mut self, idx: usize) -> Element<V> {
        match self.slots[idx].take() {
            Some(element) => {
                self.free.push(idx);
                element
            }
            None => unreachable!("release of vacant slot {idx}"),
        }
    }
}

//- Views
//- ==
//=
//- An `Entry` is a borrowed handle on an element that is still linked into the list. It can read
//- the key and value and step along the bottom lane. Holding one keeps the list borrowed, so the
//- list cannot change underneath it.
pub struct Entry<'a, V, R = StdRng> {
    list: &'a SkipList<V, R>,
    idx: usize,
}

impl<V, R> Clone for Entry<'_, V, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V, R> Copy for Entry<'_, V, R> {}

impl<'a, V, R> Entry<'a, V, R> {
    pub fn key(&self) -> &'a [u8] {
        &self.list.element(self.idx).key
    }

    pub fn value(&self) -> &'a V {
        &self.list.element(self.idx).value
    }

    pub fn height(&self) -> usize {
        self.list.element(self.idx).height()
    }

    pub fn next(&self) -> Option<Entry<'a, V, R>> {
        self.list
            .element(self.idx)
            .next_at(0)
            .map(|idx| Entry { list: self.list, idx })
    }
}

impl<V: fmt::Debug, R> fmt::Debug for Entry<'_, V, R> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self.list.element(self.idx), f)
    }
}

pub struct Iter<'a, V, R = StdRng> {
    list: &'a SkipList<V, R>,
    next: Link,
}

impl<'a, V, R> Iterator for Iter<'a, V, R> {
    type Item = (&'a [u8], &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let element = self.list.element(self.next?);
        self.next = element.next_at(0);
        Some((&element.key, &element.value))
    }
}

impl<'a, V, R> IntoIterator for &'a SkipList<V, R> {
    type Item = (&'a [u8], &'a V);
    type IntoIter = Iter<'a, V, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: Into<Vec<u8>>, V, R: RngCore> Extend<(K, V)> for SkipList<V, R> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.put(key, value);
        }
    }
}

impl<K: Into<Vec<u8>>, V> FromIterator<(K, V)> for SkipList<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut list = SkipList::new();
        list.extend(iter);
        list
    }
}

impl<V: fmt::Debug, R> fmt::Debug for SkipList<V, R> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_map()
            .entries(self.iter().map(|(key, value)| (key.escape_ascii().to_string(), value)))
            .finish()
    }
}

//- The `Display` implementation draws the lanes, sparsest first, with each key lined up under its
//- place in the bottom lane. Keys are shown with non-printable bytes escaped. Only levels that
//- hold at least one element are drawn. An example of the output:
//- ```
//- [      03,  07,                      18,  22,      ]
//- [ 01,  03,  07,       11,  12,  16,  18,  22,  99, ]
//- [ 01,  03,  07,  09,  11,  12,  16,  18,  22,  99, ]
//- ```
impl<V, R> fmt::Display for SkipList<V, R> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut base = Vec::with_capacity(self.len);
        let mut link = self.header.next_at(0);
        while let Some(idx) = link {
            let element = self.element(idx);
            base.push((idx, element.key.escape_ascii().to_string()));
            link = element.next_at(0);
        }
        let top = base
            .iter()
            .map(|&(idx, _)| self.element(idx).height())
            .max()
            .unwrap_or(0);

        for level in (0..top).rev() {
            write!(f, "[")?;
            let mut link = self.header.next_at(level);
            for (idx, label) in &base {
                if link == Some(*idx) {
                    write!(f, " {label}, ")?;
                    link = self.element(*idx).next_at(level);
                } else {
                    write!(f, "{:width$}", "", width = label.len() + 3)?;
                }
            }
            writeln!(f, "]")?;
        }
        Ok(())
    }
}
