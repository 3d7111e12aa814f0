use fxhash::FxBuildHasher;

// Both collections are created through `Default::default()`, hashbrown is built
// without its default hasher.
pub type Map<K, V> = hashbrown::HashMap<K, V, FxBuildHasher>;
pub type Set<T> = hashbrown::HashSet<T, FxBuildHasher>;
