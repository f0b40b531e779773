use std::path::Path;
use std::sync::Barrier;
use std::thread;

use super::*;
use crate::artifact::KernelArgs;

/// Artifact that "loads" any existing file.
#[derive(Debug)]
struct FileArtifact {
    path: PathBuf,
}

impl Artifact for FileArtifact {
    fn load(path: &Path) -> Result<Self, KernelError> {
        if !path.exists() {
            return Err(KernelError::ArtifactMissing { path: path.to_path_buf() });
        }
        Ok(Self { path: path.to_path_buf() })
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn has_entry_point(&self, _entry_point: &str) -> bool {
        true
    }

    unsafe fn invoke(&self, _entry_point: &str, _args: &KernelArgs<'_>) -> Result<(), KernelError> {
        Ok(())
    }
}

fn artifact_file(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"").unwrap();
    path
}

#[test]
fn second_lookup_reuses_loaded_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let path = artifact_file(dir.path(), "a.so");
    let cache: ArtifactCache<FileArtifact> = ArtifactCache::new(CacheCapacity::Unbounded);
    let kernel = KernelId::from("k_a");

    let first = cache.get_or_load(&kernel, || path.clone()).unwrap();
    let second = cache
        .get_or_load(&kernel, || unreachable!("cached artifacts skip path construction"))
        .unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(cache.loads(), 1);
    let metrics = cache.metrics();
    assert_eq!((metrics.hits, metrics.misses), (1, 1));
}

#[test]
fn missing_artifact_is_not_cached() {
    let dir = tempfile::tempdir().unwrap();
    let cache: ArtifactCache<FileArtifact> = ArtifactCache::new(CacheCapacity::Unbounded);
    let kernel = KernelId::from("k_missing");

    let err = cache.get_or_load(&kernel, || dir.path().join("lib.so")).unwrap_err();
    assert!(err.needs_build());
    assert!(cache.is_empty());
    assert_eq!(cache.loads(), 0);
}

#[test]
fn bounded_cache_evicts_but_handles_survive() {
    let dir = tempfile::tempdir().unwrap();
    let cache: ArtifactCache<FileArtifact> = ArtifactCache::new(CacheCapacity::bounded(1));
    let a = KernelId::from("k_a");
    let b = KernelId::from("k_b");

    let held = cache.get_or_load(&a, || artifact_file(dir.path(), "a.so")).unwrap();
    cache.get_or_load(&b, || artifact_file(dir.path(), "b.so")).unwrap();

    assert!(!cache.contains(&a));
    assert!(cache.contains(&b));
    assert_eq!(held.path(), dir.path().join("a.so"));
    assert_eq!(cache.metrics().evictions, 1);

    cache.get_or_load(&a, || dir.path().join("a.so")).unwrap();
    assert_eq!(cache.loads(), 3);
}

#[test]
fn racing_loads_converge_on_one_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let path = artifact_file(dir.path(), "shared.so");
    let cache: Arc<ArtifactCache<FileArtifact>> = Arc::new(ArtifactCache::new(CacheCapacity::Unbounded));
    let kernel = KernelId::from("k_shared");
    let barrier = Arc::new(Barrier::new(8));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let cache = Arc::clone(&cache);
            let barrier = Arc::clone(&barrier);
            let kernel = kernel.clone();
            let path = path.clone();
            thread::spawn(move || {
                barrier.wait();
                cache.get_or_load(&kernel, || path).unwrap()
            })
        })
        .collect();
    let artifacts: Vec<_> = handles.into_iter().map(|handle| handle.join().unwrap()).collect();

    let cached = cache.get(&kernel).unwrap();
    assert!(artifacts.iter().all(|artifact| Arc::ptr_eq(artifact, &cached)));
    assert_eq!(cache.len(), 1);
    assert!((1..=8).contains(&cache.loads()));
}
