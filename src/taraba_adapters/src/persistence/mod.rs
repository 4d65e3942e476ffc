pub mod hashmap_identity_store;

pub use hashmap_identity_store::HashMapIdentityStore;
