//! Reference-closure prefetching.
//!
//! Before a model is parsed, every file it transitively references is read
//! into the cache. The work is split into small steps so a caller can
//! interleave it with other work; [`Prefetcher::run`] simply drives it to the
//! end.

use std::collections::{HashSet, VecDeque};

use brickmesh_parse::{canonical_name, LineKind, Tokens};
use tracing::debug;

use crate::error::Result;
use crate::library::PartLibrary;

/// Outcome of one prefetch step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefetchStep {
    /// More work remains.
    Pending,
    /// The whole reference closure is cached.
    Done,
}

/// Counters for a finished prefetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrefetchStats {
    /// Files read from the source.
    pub files_loaded: usize,
    /// Files whose references were queued.
    pub files_expanded: usize,
    /// Steps taken.
    pub steps: usize,
}

/// Work queue over a model's reference closure.
#[derive(Debug)]
pub struct Prefetcher<'a> {
    library: &'a mut PartLibrary,
    queue: VecDeque<String>,
    queued: HashSet<String>,
    stats: PrefetchStats,
}

impl<'a> Prefetcher<'a> {
    /// Start prefetching everything `root` references.
    pub fn new(library: &'a mut PartLibrary, root: &str) -> Self {
        let root = canonical_name(root);
        let mut queued = HashSet::new();
        queued.insert(root.clone());
        Self {
            library,
            queue: VecDeque::from([root]),
            queued,
            stats: PrefetchStats::default(),
        }
    }

    /// Counters so far.
    pub fn stats(&self) -> PrefetchStats {
        self.stats
    }

    /// Do one unit of work: read one file, or queue one file's references.
    ///
    /// On error the queue is left as is; files read by earlier steps stay
    /// cached and nothing is cached for the failing name.
    pub fn step(&mut self) -> Result<PrefetchStep> {
        while let Some(name) = self.queue.pop_front() {
            match self.library.cache().get(&name) {
                None => {
                    // Put the name back so its references are queued next.
                    self.queue.push_front(name.clone());
                    if let Err(e) = self.library.load(&name) {
                        self.queue.pop_front();
                        return Err(e);
                    }
                    self.stats.files_loaded += 1;
                    self.stats.steps += 1;
                    debug!(name = %name, queued = self.queue.len(), "prefetched file");
                    return Ok(PrefetchStep::Pending);
                }
                Some(file) if !file.expanded => {
                    let children = reference_names(&file.lines);
                    self.library.cache_mut().mark_expanded(&name);
                    for child in children {
                        let expanded = self
                            .library
                            .cache()
                            .get(&child)
                            .is_some_and(|f| f.expanded);
                        if !expanded && self.queued.insert(child.clone()) {
                            self.queue.push_back(child);
                        }
                    }
                    self.stats.files_expanded += 1;
                    self.stats.steps += 1;
                    return Ok(PrefetchStep::Pending);
                }
                Some(_) => {}
            }
        }
        Ok(PrefetchStep::Done)
    }

    /// Step until done.
    pub fn run(mut self) -> Result<PrefetchStats> {
        while self.step()? == PrefetchStep::Pending {}
        debug!(
            loaded = self.stats.files_loaded,
            expanded = self.stats.files_expanded,
            "prefetch complete"
        );
        Ok(self.stats)
    }
}

/// Canonical names referenced by `1` lines, in order. Malformed lines are
/// skipped here; the parser reports them.
pub fn reference_names<S: AsRef<str>>(lines: &[S]) -> Vec<String> {
    lines
        .iter()
        .filter_map(|line| {
            let mut tokens = Tokens::new(line.as_ref());
            match tokens.line_kind() {
                Some(Ok(LineKind::Reference)) => {}
                _ => return None,
            }
            // colour + 12 matrix numbers
            if tokens.by_ref().take(13).count() < 13 {
                return None;
            }
            let name = tokens.remainder();
            (!name.is_empty()).then(|| canonical_name(&name))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LibraryError;
    use crate::source::MemorySource;

    const REF: &str = "1 16 0 0 0 1 0 0 0 1 0 0 0 1";

    fn source() -> MemorySource {
        MemorySource::new()
            .with("models/car.ldr", format!("0 Car\n{REF} 3001.dat\n{REF} 3001.dat\n{REF} wheel.ldr\n"))
            .with("models/wheel.ldr", format!("{REF} 3001.dat\n{REF} car.ldr\n"))
            .with("parts/3001.dat", format!("{REF} s/3001s01.dat\n"))
            .with("parts/s/3001s01.dat", "3 16 0 0 0 1 0 0 0 1 0\n")
    }

    #[test]
    fn test_reference_names() {
        let lines = [
            format!("{REF} Sub Part.DAT"),
            "1 16 0 0 0".to_string(),
            format!("{REF}"),
            "3 16 0 0 0 1 0 0 0 1 0".to_string(),
        ];
        assert_eq!(reference_names(&lines), vec!["sub part.dat"]);
    }

    #[test]
    fn test_prefetch_closure() {
        let mut lib = PartLibrary::new(source());
        let stats = Prefetcher::new(&mut lib, "car.ldr").run().unwrap();
        assert_eq!(stats.files_loaded, 4);
        assert_eq!(stats.files_expanded, 4);
        assert_eq!(lib.cache().len(), 4);
        assert!(lib.get("s/3001s01.dat").unwrap().expanded);
    }

    #[test]
    fn test_prefetch_steps_are_small() {
        let mut lib = PartLibrary::new(source());
        let mut prefetch = Prefetcher::new(&mut lib, "car.ldr");
        assert_eq!(prefetch.step().unwrap(), PrefetchStep::Pending);
        assert_eq!(prefetch.stats().files_loaded, 1);
        assert_eq!(prefetch.stats().files_expanded, 0);
        assert_eq!(prefetch.step().unwrap(), PrefetchStep::Pending);
        assert_eq!(prefetch.stats().files_expanded, 1);
        let mut steps = 2;
        while prefetch.step().unwrap() == PrefetchStep::Pending {
            steps += 1;
        }
        assert_eq!(steps, 8);
    }

    #[test]
    fn test_prefetch_failure_keeps_loaded_files() {
        let src = source().with("models/bad.ldr", format!("{REF} 3001.dat\n{REF} nope.dat\n"));
        let mut lib = PartLibrary::new(src);
        let err = Prefetcher::new(&mut lib, "bad.ldr").run().unwrap_err();
        assert!(matches!(err, LibraryError::MissingPart(ref n) if n == "nope.dat"));
        assert!(lib.get("bad.ldr").is_some());
        assert!(lib.get("3001.dat").is_some());
        assert!(lib.get("nope.dat").is_none());
    }
}
