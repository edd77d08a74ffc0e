//! Wait-for graph over singleton builds running on different threads.
//!
//! A thread that finds a singleton under construction elsewhere records the
//! slot it is about to wait on. Following "slot -> thread building it -> slot
//! that thread waits on" from there must never lead back to the waiter; if it
//! does, every thread on the loop would block forever, so the waiter reports
//! the loop as a circular dependency instead of blocking.

use std::thread::ThreadId;

use super::FastMap;

#[derive(Default)]
pub(crate) struct WaitGraph {
    /// slot id -> (builder thread, display name of the slot's key)
    builders: FastMap<u64, (ThreadId, &'static str)>,
    /// thread -> slot id it is blocked on
    waiting: FastMap<ThreadId, u64>,
}

impl WaitGraph {
    pub(crate) fn building(&mut self, slot: u64, name: &'static str, builder: ThreadId) {
        self.builders.insert(slot, (builder, name));
    }

    pub(crate) fn built(&mut self, slot: u64) {
        self.builders.remove(&slot);
    }

    /// Records that `me` is about to block on `slot`.
    ///
    /// Fails with the key names of the loop, outermost build first, when
    /// blocking would close a cycle. Nothing is recorded in that case.
    pub(crate) fn wait_for(&mut self, me: ThreadId, slot: u64) -> Result<(), Vec<&'static str>> {
        let mut chain = Vec::new();
        let mut current = slot;

        while let Some(&(builder, name)) = self.builders.get(&current) {
            chain.push(name);
            if builder == me {
                let mut path = Vec::with_capacity(chain.len() + 1);
                path.push(name);
                path.extend(chain);
                return Err(path);
            }
            match self.waiting.get(&builder) {
                Some(&next) if chain.len() <= self.waiting.len() => current = next,
                _ => break,
            }
        }

        self.waiting.insert(me, slot);
        Ok(())
    }

    pub(crate) fn stop_waiting(&mut self, me: ThreadId) {
        self.waiting.remove(&me);
    }

    #[cfg(test)]
    pub(crate) fn is_idle(&self) -> bool {
        self.builders.is_empty() && self.waiting.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn other_thread() -> ThreadId {
        thread::spawn(|| thread::current().id()).join().unwrap()
    }

    #[test]
    fn waiting_on_an_unrelated_build_is_allowed() {
        let me = thread::current().id();
        let other = other_thread();
        let mut graph = WaitGraph::default();

        graph.building(1, "X", other);
        assert!(graph.wait_for(me, 1).is_ok());
        graph.stop_waiting(me);
        graph.built(1);
        assert!(graph.waiting.is_empty());
        assert!(graph.builders.is_empty());
    }

    #[test]
    fn two_thread_loop_is_reported() {
        let me = thread::current().id();
        let other = other_thread();
        let mut graph = WaitGraph::default();

        // me builds X and other builds Y; other already waits on X.
        graph.building(1, "X", me);
        graph.building(2, "Y", other);
        graph.wait_for(other, 1).unwrap();

        assert_eq!(graph.wait_for(me, 2), Err(vec!["X", "Y", "X"]));
        assert!(!graph.waiting.contains_key(&me));
    }

    #[test]
    fn own_build_is_reported() {
        let me = thread::current().id();
        let mut graph = WaitGraph::default();

        graph.building(7, "Z", me);
        assert_eq!(graph.wait_for(me, 7), Err(vec!["Z", "Z"]));
    }
}
