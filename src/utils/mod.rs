pub mod snapshot_cache;
