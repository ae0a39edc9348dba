//! Policies decide which replicas of a partition an operation contacts, in which order, and when the
//! responses received so far are enough to end the operation.
//!
//! A policy is owned by exactly one `Operation` and is only ever touched from that operation's driver
//! loop. Replica responses reach the driver through its response queue; they never update a policy
//! from a request task. That is why none of the policies here have any locking. Keep it that way:
//! if a request task needs to influence the tally, send it through the queue.

use crate::clustermap::{Partition, ReplicaId};
use rand::seq::SliceRandom;
use std::collections::{HashSet, VecDeque};

pub(crate) trait OperationPolicy: Send {
    /// `replica_ids_for_fan_out()` returns the replicas to contact now. It's called once when the
    /// operation starts and again after every response. Each replica is returned at most once over
    /// the lifetime of the policy, and an empty result just means "nothing new to contact yet".
    fn replica_ids_for_fan_out(&mut self) -> Vec<ReplicaId>;

    fn on_successful_response(&mut self, replica_id: &ReplicaId);

    fn on_failed_response(&mut self, replica_id: &ReplicaId);

    /// `is_complete()` returns true once enough replicas succeeded for the operation to succeed.
    fn is_complete(&self) -> bool;

    /// `has_failed()` returns true once so many replicas failed that success is no longer reachable.
    fn has_failed(&self) -> bool;

    fn replica_count(&self) -> usize;
}

/// `quorum_size()` is the minimum number of acks for a majority of `replica_count` replicas.
pub(crate) fn quorum_size(replica_count: usize) -> usize {
    (replica_count / 2) + 1
}

/// Local datacenter replicas come first. Each group is shuffled so load spreads across replicas.
fn local_first_shuffled(local_datacenter: &str, partition: &Partition) -> VecDeque<ReplicaId> {
    let mut rng = rand::thread_rng();
    let (mut local, mut remote): (Vec<ReplicaId>, Vec<ReplicaId>) = partition
        .replica_ids()
        .iter()
        .cloned()
        .partition(|replica_id| replica_id.datacenter() == local_datacenter);
    local.shuffle(&mut rng);
    remote.shuffle(&mut rng);

    local.into_iter().chain(remote.into_iter()).collect()
}

#[derive(Default)]
struct ResponseTally {
    succeeded: HashSet<ReplicaId>,
    failed: HashSet<ReplicaId>,
}

impl ResponseTally {
    fn num_succeeded(&self) -> usize {
        self.succeeded.len()
    }

    fn num_failed(&self) -> usize {
        self.failed.len()
    }

    fn num_responded(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }
}

/// AllInParallelPolicy contacts every replica at once. One success completes the operation. The
/// operation only fails when every single replica has failed.
pub(crate) struct AllInParallelPolicy {
    replica_count: usize,
    not_yet_contacted: VecDeque<ReplicaId>,
    tally: ResponseTally,
}

impl AllInParallelPolicy {
    pub(crate) fn new(local_datacenter: &str, partition: &Partition) -> Self {
        AllInParallelPolicy {
            replica_count: partition.replica_count(),
            not_yet_contacted: local_first_shuffled(local_datacenter, partition),
            tally: ResponseTally::default(),
        }
    }
}

impl OperationPolicy for AllInParallelPolicy {
    fn replica_ids_for_fan_out(&mut self) -> Vec<ReplicaId> {
        self.not_yet_contacted.drain(..).collect()
    }

    fn on_successful_response(&mut self, replica_id: &ReplicaId) {
        self.tally.succeeded.insert(replica_id.clone());
    }

    fn on_failed_response(&mut self, replica_id: &ReplicaId) {
        self.tally.failed.insert(replica_id.clone());
    }

    fn is_complete(&self) -> bool {
        self.tally.num_succeeded() >= 1
    }

    fn has_failed(&self) -> bool {
        !self.is_complete() && self.tally.num_failed() >= self.replica_count
    }

    fn replica_count(&self) -> usize {
        self.replica_count
    }
}

/// SerialPolicy contacts one replica at a time, and only moves on to the next replica after the
/// previous one failed. One success completes the operation.
pub(crate) struct SerialPolicy {
    replica_count: usize,
    not_yet_contacted: VecDeque<ReplicaId>,
    num_contacted: usize,
    tally: ResponseTally,
}

impl SerialPolicy {
    pub(crate) fn new(local_datacenter: &str, partition: &Partition) -> Self {
        SerialPolicy {
            replica_count: partition.replica_count(),
            not_yet_contacted: local_first_shuffled(local_datacenter, partition),
            num_contacted: 0,
            tally: ResponseTally::default(),
        }
    }

    fn num_in_flight(&self) -> usize {
        self.num_contacted - self.tally.num_responded()
    }
}

impl OperationPolicy for SerialPolicy {
    fn replica_ids_for_fan_out(&mut self) -> Vec<ReplicaId> {
        if self.is_complete() || self.num_in_flight() > 0 {
            return Vec::new();
        }

        match self.not_yet_contacted.pop_front() {
            Some(replica_id) => {
                self.num_contacted += 1;
                vec![replica_id]
            }
            None => Vec::new(),
        }
    }

    fn on_successful_response(&mut self, replica_id: &ReplicaId) {
        self.tally.succeeded.insert(replica_id.clone());
    }

    fn on_failed_response(&mut self, replica_id: &ReplicaId) {
        self.tally.failed.insert(replica_id.clone());
    }

    fn is_complete(&self) -> bool {
        self.tally.num_succeeded() >= 1
    }

    fn has_failed(&self) -> bool {
        !self.is_complete() && self.tally.num_failed() >= self.replica_count
    }

    fn replica_count(&self) -> usize {
        self.replica_count
    }
}

/// QuorumPolicy contacts every replica at once and requires a majority of them to succeed. It fails
/// as soon as enough replicas failed that a majority can't be reached anymore.
pub(crate) struct QuorumPolicy {
    replica_count: usize,
    quorum: usize,
    not_yet_contacted: VecDeque<ReplicaId>,
    tally: ResponseTally,
}

impl QuorumPolicy {
    pub(crate) fn new(local_datacenter: &str, partition: &Partition) -> Self {
        let replica_count = partition.replica_count();
        QuorumPolicy {
            replica_count,
            quorum: quorum_size(replica_count),
            not_yet_contacted: local_first_shuffled(local_datacenter, partition),
            tally: ResponseTally::default(),
        }
    }
}

impl OperationPolicy for QuorumPolicy {
    fn replica_ids_for_fan_out(&mut self) -> Vec<ReplicaId> {
        self.not_yet_contacted.drain(..).collect()
    }

    fn on_successful_response(&mut self, replica_id: &ReplicaId) {
        self.tally.succeeded.insert(replica_id.clone());
    }

    fn on_failed_response(&mut self, replica_id: &ReplicaId) {
        self.tally.failed.insert(replica_id.clone());
    }

    fn is_complete(&self) -> bool {
        self.tally.num_succeeded() >= self.quorum
    }

    fn has_failed(&self) -> bool {
        !self.is_complete() && self.tally.num_failed() > self.replica_count - self.quorum
    }

    fn replica_count(&self) -> usize {
        self.replica_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clustermap::{ClusterInfo, ClusterMap, PartitionId, PartitionInfo, PartitionState, ReplicaInfo};
    use std::sync::Arc;

    /// Replicas alternate between "dc1" and "dc2", starting with "dc1".
    fn test_partition(replica_count: usize) -> Arc<Partition> {
        let replicas = (0..replica_count)
            .map(|i| ReplicaInfo {
                hostname: "localhost".to_string(),
                port: 6000 + i as u16,
                datacenter: if i % 2 == 0 { "dc1" } else { "dc2" }.to_string(),
            })
            .collect();
        let cluster_map = ClusterMap::try_new(ClusterInfo {
            partitions: vec![PartitionInfo {
                partition_id: 1,
                state: PartitionState::ReadWrite,
                replicas,
            }],
        })
        .unwrap();
        cluster_map.partition(PartitionId::new(1)).unwrap()
    }

    #[test]
    fn quorum_size_arithmetic() {
        fn run(replica_count: usize, expected: usize) {
            assert_eq!(quorum_size(replica_count), expected, "replica_count: {}", replica_count);
        }

        run(1, 1);
        run(2, 2);
        run(3, 2);
        run(4, 3);
        run(5, 3);
        run(6, 4);
        run(7, 4);
    }

    #[test]
    fn fan_out_is_local_datacenter_first() {
        let partition = test_partition(5);
        let mut policy = AllInParallelPolicy::new("dc2", &partition);
        let fan_out = policy.replica_ids_for_fan_out();

        let datacenters: Vec<_> = fan_out.iter().map(|r| r.datacenter().to_string()).collect();
        assert_eq!(datacenters, vec!["dc2", "dc2", "dc1", "dc1", "dc1"]);

        let unique: HashSet<_> = fan_out.iter().cloned().collect();
        assert_eq!(unique.len(), 5);
    }

    #[test]
    fn all_in_parallel_first_success_wins() {
        for replica_count in 1..=5 {
            let partition = test_partition(replica_count);
            let mut policy = AllInParallelPolicy::new("dc1", &partition);

            let fan_out = policy.replica_ids_for_fan_out();
            assert_eq!(fan_out.len(), replica_count);
            assert!(policy.replica_ids_for_fan_out().is_empty());

            // Every replica but the last one fails.
            for replica_id in &fan_out[..replica_count - 1] {
                policy.on_failed_response(replica_id);
                assert!(!policy.is_complete());
                assert!(!policy.has_failed());
            }

            policy.on_successful_response(&fan_out[replica_count - 1]);
            assert!(policy.is_complete());
            assert!(!policy.has_failed());
        }
    }

    #[test]
    fn all_in_parallel_fails_only_when_all_failed() {
        let partition = test_partition(3);
        let mut policy = AllInParallelPolicy::new("dc1", &partition);
        let fan_out = policy.replica_ids_for_fan_out();

        policy.on_failed_response(&fan_out[0]);
        policy.on_failed_response(&fan_out[1]);
        assert!(!policy.has_failed());

        // Duplicate answers from the same replica don't count twice.
        policy.on_failed_response(&fan_out[1]);
        assert!(!policy.has_failed());

        policy.on_failed_response(&fan_out[2]);
        assert!(policy.has_failed());
        assert!(!policy.is_complete());
    }

    #[test]
    fn serial_contacts_one_at_a_time() {
        let partition = test_partition(3);
        let mut policy = SerialPolicy::new("dc1", &partition);

        let first = policy.replica_ids_for_fan_out();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].datacenter(), "dc1");
        // Nothing new while the first request is outstanding.
        assert!(policy.replica_ids_for_fan_out().is_empty());

        policy.on_failed_response(&first[0]);
        let second = policy.replica_ids_for_fan_out();
        assert_eq!(second.len(), 1);
        assert_ne!(second[0], first[0]);
        assert_eq!(second[0].datacenter(), "dc1");

        policy.on_failed_response(&second[0]);
        let third = policy.replica_ids_for_fan_out();
        assert_eq!(third[0].datacenter(), "dc2");
        assert!(!policy.has_failed());

        policy.on_successful_response(&third[0]);
        assert!(policy.is_complete());
        assert!(policy.replica_ids_for_fan_out().is_empty());
    }

    #[test]
    fn serial_fails_when_all_failed() {
        let partition = test_partition(2);
        let mut policy = SerialPolicy::new("dc1", &partition);

        for _ in 0..2 {
            let next = policy.replica_ids_for_fan_out();
            assert_eq!(next.len(), 1);
            policy.on_failed_response(&next[0]);
        }

        assert!(policy.has_failed());
        assert!(policy.replica_ids_for_fan_out().is_empty());
    }

    #[test]
    fn quorum_completes_with_majority() {
        // N=3: 2 successes are enough, no need for the third response.
        let partition = test_partition(3);
        let mut policy = QuorumPolicy::new("dc1", &partition);
        let fan_out = policy.replica_ids_for_fan_out();
        assert_eq!(fan_out.len(), 3);

        policy.on_successful_response(&fan_out[0]);
        assert!(!policy.is_complete());
        policy.on_successful_response(&fan_out[1]);
        assert!(policy.is_complete());

        // N=4: exactly 3 successes are required.
        let partition = test_partition(4);
        let mut policy = QuorumPolicy::new("dc1", &partition);
        let fan_out = policy.replica_ids_for_fan_out();

        policy.on_successful_response(&fan_out[0]);
        policy.on_successful_response(&fan_out[1]);
        assert!(!policy.is_complete());
        policy.on_failed_response(&fan_out[2]);
        assert!(!policy.is_complete());
        assert!(!policy.has_failed());
        policy.on_successful_response(&fan_out[3]);
        assert!(policy.is_complete());
    }

    #[test]
    fn quorum_fails_when_majority_unreachable() {
        fn run(replica_count: usize, failures_to_fail: usize) {
            let partition = test_partition(replica_count);
            let mut policy = QuorumPolicy::new("dc1", &partition);
            let fan_out = policy.replica_ids_for_fan_out();

            for replica_id in &fan_out[..failures_to_fail - 1] {
                policy.on_failed_response(replica_id);
            }
            assert!(!policy.has_failed(), "replica_count: {}", replica_count);

            policy.on_failed_response(&fan_out[failures_to_fail - 1]);
            assert!(policy.has_failed(), "replica_count: {}", replica_count);
        }

        run(1, 1);
        run(2, 1);
        run(3, 2);
        run(4, 2);
        run(5, 3);
        run(6, 3);
    }
}
