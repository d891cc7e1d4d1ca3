#[cfg(test)]
mod tests {
    use crate::bootstrap::ProcessGroup;
    use crate::cluster::directory::ClusterDirectory;
    use crate::containers::{
        ContainerOptions, KeyRange, Multimap, OrderedMap, PriorityQueue, Queue, Set, UnorderedMap,
    };
    use crate::error::ShardboxError;
    use crate::rpc::RpcService;
    use serde::{Deserialize, Serialize};
    use std::cmp::Ordering as CmpOrdering;
    use std::collections::BTreeSet;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU16, Ordering};

    // Each test reserves its own base port so parallel tests never collide.
    static NEXT_BASE_PORT: AtomicU16 = AtomicU16::new(19400);

    fn reserve_ports(count: u16) -> u16 {
        NEXT_BASE_PORT.fetch_add(count, Ordering::SeqCst)
    }

    /// Simulates a job of `num_servers` server processes inside this test:
    /// one directory + RPC service per simulated process, all joined on one
    /// bootstrap group.
    async fn simulated_job(num_servers: u16) -> (Vec<Arc<RpcService>>, Vec<Arc<ProcessGroup>>) {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .try_init();
        let base_port = reserve_ports(num_servers);
        let hosts = vec!["127.0.0.1".to_string(); num_servers as usize];
        let mut services = Vec::new();
        for shard in 0..num_servers {
            let directory = ClusterDirectory::new(hosts.clone(), base_port, shard, true).unwrap();
            services.push(RpcService::start(directory).await.unwrap());
        }
        let groups = ProcessGroup::group(num_servers as usize);
        (services, groups)
    }

    fn server_options(name: &str, shard: u16, num_servers: u16) -> ContainerOptions {
        ContainerOptions::new(name)
            .with_is_server(true)
            .with_my_server(shard)
            .with_num_servers(num_servers)
            .with_server_on_node(true)
    }

    // ============================================================
    // ORDERED MAP
    // ============================================================

    #[tokio::test(flavor = "multi_thread")]
    async fn test_map_put_and_get_across_two_servers() {
        let (services, groups) = simulated_job(2).await;

        let (m0, m1) = tokio::join!(
            OrderedMap::<u64, String>::new(
                server_options("t1", 0, 2),
                services[0].clone(),
                groups[0].as_ref(),
            ),
            OrderedMap::<u64, String>::new(
                server_options("t1", 1, 2),
                services[1].clone(),
                groups[1].as_ref(),
            ),
        );
        let m0 = m0.unwrap();
        let m1 = m1.unwrap();

        // Writes from rank 0, reads from rank 1: some keys stay local, some
        // cross the wire, depending on where they hash.
        for key in 0..20u64 {
            assert!(m0.put(key, format!("v{}", key)).await.unwrap());
        }
        for key in 0..20u64 {
            let (found, value) = m1.get(&key).await.unwrap();
            assert!(found, "key {} should exist", key);
            assert_eq!(value, format!("v{}", key));
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_map_overwrite_last_writer_wins() {
        let (services, groups) = simulated_job(2).await;
        let (m0, m1) = tokio::join!(
            OrderedMap::<u64, String>::new(
                server_options("t2", 0, 2),
                services[0].clone(),
                groups[0].as_ref(),
            ),
            OrderedMap::<u64, String>::new(
                server_options("t2", 1, 2),
                services[1].clone(),
                groups[1].as_ref(),
            ),
        );
        let m0 = m0.unwrap();
        let m1 = m1.unwrap();

        m0.put(5, "x".to_string()).await.unwrap();
        m0.put(5, "y".to_string()).await.unwrap();
        assert_eq!(m1.get(&5).await.unwrap(), (true, "y".to_string()));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_map_erase_then_get() {
        let (services, groups) = simulated_job(2).await;
        let (m0, m1) = tokio::join!(
            OrderedMap::<u64, String>::new(
                server_options("t3", 0, 2),
                services[0].clone(),
                groups[0].as_ref(),
            ),
            OrderedMap::<u64, String>::new(
                server_options("t3", 1, 2),
                services[1].clone(),
                groups[1].as_ref(),
            ),
        );
        let m0 = m0.unwrap();
        let m1 = m1.unwrap();

        m0.put(9, "z".to_string()).await.unwrap();
        assert_eq!(m1.erase(&9).await.unwrap(), (true, String::new()));
        assert_eq!(m0.get(&9).await.unwrap(), (false, String::new()));

        // Erasing a missing key is a miss, not an error.
        assert_eq!(m0.erase(&9).await.unwrap(), (false, String::new()));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_map_get_all_data_is_complete_and_shard_ordered() {
        let (services, groups) = simulated_job(3).await;
        let (m0, m1, m2) = tokio::join!(
            OrderedMap::<u64, String>::new(
                server_options("t5", 0, 3),
                services[0].clone(),
                groups[0].as_ref(),
            ),
            OrderedMap::<u64, String>::new(
                server_options("t5", 1, 3),
                services[1].clone(),
                groups[1].as_ref(),
            ),
            OrderedMap::<u64, String>::new(
                server_options("t5", 2, 3),
                services[2].clone(),
                groups[2].as_ref(),
            ),
        );
        let m0 = m0.unwrap();
        let _m1 = m1.unwrap();
        let _m2 = m2.unwrap();

        let mut expected = BTreeSet::new();
        for key in 0..30u64 {
            m0.put(key, format!("v{}", key)).await.unwrap();
            expected.insert((key, format!("v{}", key)));
        }

        let all = m0.get_all_data().await.unwrap();

        // Every inserted pair exactly once.
        assert_eq!(all.len(), 30);
        let as_set: BTreeSet<_> = all.iter().cloned().collect();
        assert_eq!(as_set, expected);

        // Concatenated in shard id order.
        let shards: Vec<u16> = all.iter().map(|(key, _)| m0.shard_of(key)).collect();
        assert!(
            shards.windows(2).all(|pair| pair[0] <= pair[1]),
            "results must group by ascending shard id: {:?}",
            shards
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_fan_out_fails_when_a_shard_is_gone() {
        let (mut services, groups) = simulated_job(2).await;
        let (m0, m1) = tokio::join!(
            OrderedMap::<u64, String>::new(
                server_options("t6", 0, 2),
                services[0].clone(),
                groups[0].as_ref(),
            ),
            OrderedMap::<u64, String>::new(
                server_options("t6", 1, 2),
                services[1].clone(),
                groups[1].as_ref(),
            ),
        );
        let m0 = m0.unwrap();
        let m1 = m1.unwrap();

        for key in 0..10u64 {
            m0.put(key, "v".to_string()).await.unwrap();
        }

        // Shard 1's server goes away; the fan-out must fail as a whole
        // rather than return partial results.
        drop(m1);
        services.truncate(1);
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        assert!(m0.get_all_data().await.is_err());
    }

    // ============================================================
    // RANGE-CONTAINS
    // ============================================================

    #[derive(
        Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
    )]
    struct Interval {
        lo: u32,
        hi: u32,
    }

    impl Interval {
        fn new(lo: u32, hi: u32) -> Self {
            Self { lo, hi }
        }
    }

    impl KeyRange for Interval {
        fn covers(&self, other: &Self) -> bool {
            self.lo <= other.hi && other.lo <= self.hi
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_map_contains_over_interval_keys() {
        let (services, groups) = simulated_job(1).await;
        let map = OrderedMap::<Interval, String>::new(
            server_options("ranges", 0, 1),
            services[0].clone(),
            groups[0].as_ref(),
        )
        .await
        .unwrap();

        map.put(Interval::new(0, 10), "p".to_string()).await.unwrap();
        map.put(Interval::new(20, 30), "q".to_string()).await.unwrap();

        let hits = map.contains(&Interval::new(5, 7)).await.unwrap();
        assert_eq!(hits, vec![(Interval::new(0, 10), "p".to_string())]);

        let hits = map.contains(&Interval::new(0, 25)).await.unwrap();
        assert_eq!(
            hits,
            vec![
                (Interval::new(0, 10), "p".to_string()),
                (Interval::new(20, 30), "q".to_string()),
            ]
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_map_contains_boundaries() {
        let (services, groups) = simulated_job(1).await;
        let map = OrderedMap::<Interval, String>::new(
            server_options("ranges2", 0, 1),
            services[0].clone(),
            groups[0].as_ref(),
        )
        .await
        .unwrap();

        // Empty shard: empty result.
        assert!(map.contains(&Interval::new(1, 2)).await.unwrap().is_empty());

        // A single unrelated entry never matches.
        map.put(Interval::new(50, 60), "r".to_string()).await.unwrap();
        assert!(map.contains(&Interval::new(0, 5)).await.unwrap().is_empty());
        assert!(map.contains(&Interval::new(70, 80)).await.unwrap().is_empty());

        // The scan starts at the lower bound, so a probe sorting at or
        // before the stored key reaches it.
        let hits = map.contains(&Interval::new(45, 55)).await.unwrap();
        assert_eq!(hits, vec![(Interval::new(50, 60), "r".to_string())]);

        // A probe sorting after every key on the shard hits the end
        // sentinel and returns empty, even though the stored range overlaps
        // it. Known limit of the lower-bound cutoff.
        assert!(map.contains(&Interval::new(55, 58)).await.unwrap().is_empty());
    }

    // ============================================================
    // UNORDERED MAP
    // ============================================================

    #[tokio::test(flavor = "multi_thread")]
    async fn test_unordered_map_routing_is_stable_across_participants() {
        let (services, groups) = simulated_job(2).await;
        let (m0, m1) = tokio::join!(
            UnorderedMap::<String, u64>::new(
                server_options("u1", 0, 2),
                services[0].clone(),
                groups[0].as_ref(),
            ),
            UnorderedMap::<String, u64>::new(
                server_options("u1", 1, 2),
                services[1].clone(),
                groups[1].as_ref(),
            ),
        );
        let m0 = m0.unwrap();
        let m1 = m1.unwrap();

        for i in 0..100 {
            let key = format!("key_{}", i);
            assert_eq!(m0.shard_of(&key), m1.shard_of(&key));
            assert!(m0.shard_of(&key) < 2);
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_unordered_map_idempotent_put_and_fanout_completeness() {
        let (services, groups) = simulated_job(2).await;
        let (m0, m1) = tokio::join!(
            UnorderedMap::<String, u64>::new(
                server_options("u2", 0, 2),
                services[0].clone(),
                groups[0].as_ref(),
            ),
            UnorderedMap::<String, u64>::new(
                server_options("u2", 1, 2),
                services[1].clone(),
                groups[1].as_ref(),
            ),
        );
        let m0 = m0.unwrap();
        let m1 = m1.unwrap();

        for i in 0..25u64 {
            let key = format!("key_{}", i);
            m0.put(key.clone(), i).await.unwrap();
            // Re-putting the same pair must be observationally equivalent.
            m0.put(key, i).await.unwrap();
        }

        let all = m1.get_all_data().await.unwrap();
        assert_eq!(all.len(), 25);
        let as_set: BTreeSet<_> = all.into_iter().collect();
        let expected: BTreeSet<_> = (0..25u64).map(|i| (format!("key_{}", i), i)).collect();
        assert_eq!(as_set, expected);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_unordered_map_miss_returns_default() {
        let (services, groups) = simulated_job(1).await;
        let map = UnorderedMap::<String, u64>::new(
            server_options("u3", 0, 1),
            services[0].clone(),
            groups[0].as_ref(),
        )
        .await
        .unwrap();

        assert_eq!(map.get(&"absent".to_string()).await.unwrap(), (false, 0));
        assert_eq!(map.erase(&"absent".to_string()).await.unwrap(), (false, 0));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_client_only_participant_operates_remotely() {
        let base_port = reserve_ports(1);
        let hosts = vec!["127.0.0.1".to_string()];

        let server_directory =
            ClusterDirectory::new(hosts.clone(), base_port, 0, true).unwrap();
        let server_service = RpcService::start(server_directory).await.unwrap();

        let client_directory = ClusterDirectory::new(hosts, base_port, 0, false).unwrap();
        let client_service = RpcService::start(client_directory).await.unwrap();

        let groups = ProcessGroup::group(2);
        let (server_map, client_map) = tokio::join!(
            UnorderedMap::<u64, String>::new(
                server_options("u4", 0, 1),
                server_service.clone(),
                groups[0].as_ref(),
            ),
            UnorderedMap::<u64, String>::new(
                ContainerOptions::new("u4").with_num_servers(1),
                client_service.clone(),
                groups[1].as_ref(),
            ),
        );
        let server_map = server_map.unwrap();
        let client_map = client_map.unwrap();

        client_map.put(1, "from-client".to_string()).await.unwrap();
        assert_eq!(
            server_map.get(&1).await.unwrap(),
            (true, "from-client".to_string())
        );
        assert_eq!(
            client_map.erase(&1).await.unwrap(),
            (true, String::new())
        );
        assert_eq!(client_map.get(&1).await.unwrap(), (false, String::new()));
    }

    // ============================================================
    // PRIORITY QUEUE
    // ============================================================

    #[tokio::test(flavor = "multi_thread")]
    async fn test_priority_queue_pops_in_comparator_order() {
        let (services, groups) = simulated_job(2).await;
        let (q0, q1) = tokio::join!(
            PriorityQueue::<u64>::new(
                server_options("pq1", 0, 2),
                services[0].clone(),
                groups[0].as_ref(),
            ),
            PriorityQueue::<u64>::new(
                server_options("pq1", 1, 2),
                services[1].clone(),
                groups[1].as_ref(),
            ),
        );
        let q0 = q0.unwrap();
        let q1 = q1.unwrap();

        // Pushed onto shard 0 from rank 1, so every push crosses the wire.
        q1.push(3, 0).await.unwrap();
        q1.push(1, 0).await.unwrap();
        q1.push(2, 0).await.unwrap();

        assert_eq!(q0.pop(0).await.unwrap(), (true, 3));
        assert_eq!(q0.pop(0).await.unwrap(), (true, 2));
        assert_eq!(q0.pop(0).await.unwrap(), (true, 1));
        assert_eq!(q0.pop(0).await.unwrap(), (false, 0));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_priority_queue_remote_top_does_not_mutate() {
        let (services, groups) = simulated_job(2).await;
        let (q0, q1) = tokio::join!(
            PriorityQueue::<u64>::new(
                server_options("pq2", 0, 2),
                services[0].clone(),
                groups[0].as_ref(),
            ),
            PriorityQueue::<u64>::new(
                server_options("pq2", 1, 2),
                services[1].clone(),
                groups[1].as_ref(),
            ),
        );
        let q0 = q0.unwrap();
        let q1 = q1.unwrap();

        q0.push(7, 0).await.unwrap();
        q0.push(9, 0).await.unwrap();

        // Peeking from the remote rank must leave the shard intact.
        assert_eq!(q1.top(0).await.unwrap(), (true, 9));
        assert_eq!(q1.top(0).await.unwrap(), (true, 9));
        assert_eq!(q1.size(0).await.unwrap(), 2);

        assert_eq!(q0.pop(0).await.unwrap(), (true, 9));
        assert_eq!(q0.pop(0).await.unwrap(), (true, 7));
    }

    /// Earliest deadline compares greatest, so the max-heap pops it first.
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
    struct Deadline(u64);

    impl Ord for Deadline {
        fn cmp(&self, other: &Self) -> CmpOrdering {
            other.0.cmp(&self.0)
        }
    }

    impl PartialOrd for Deadline {
        fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
            Some(self.cmp(other))
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_priority_queue_custom_order_via_newtype() {
        let (services, groups) = simulated_job(1).await;
        let queue = PriorityQueue::<Deadline>::new(
            server_options("pq3", 0, 1),
            services[0].clone(),
            groups[0].as_ref(),
        )
        .await
        .unwrap();

        queue.push(Deadline(3), 0).await.unwrap();
        queue.push(Deadline(1), 0).await.unwrap();
        queue.push(Deadline(2), 0).await.unwrap();

        assert_eq!(queue.pop(0).await.unwrap(), (true, Deadline(1)));
        assert_eq!(queue.pop(0).await.unwrap(), (true, Deadline(2)));
        assert_eq!(queue.pop(0).await.unwrap(), (true, Deadline(3)));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_priority_queue_empty_top_and_out_of_range_shard() {
        let (services, groups) = simulated_job(1).await;
        let queue = PriorityQueue::<u64>::new(
            server_options("pq4", 0, 1),
            services[0].clone(),
            groups[0].as_ref(),
        )
        .await
        .unwrap();

        assert_eq!(queue.top(0).await.unwrap(), (false, 0));
        assert_eq!(queue.size(0).await.unwrap(), 0);
        assert!(matches!(
            queue.push(1, 1).await,
            Err(ShardboxError::Config(_))
        ));
    }

    // ============================================================
    // QUEUE
    // ============================================================

    #[tokio::test(flavor = "multi_thread")]
    async fn test_queue_is_fifo_per_shard() {
        let (services, groups) = simulated_job(2).await;
        let (q0, q1) = tokio::join!(
            Queue::<String>::new(
                server_options("q1", 0, 2),
                services[0].clone(),
                groups[0].as_ref(),
            ),
            Queue::<String>::new(
                server_options("q1", 1, 2),
                services[1].clone(),
                groups[1].as_ref(),
            ),
        );
        let q0 = q0.unwrap();
        let q1 = q1.unwrap();

        for label in ["a", "b", "c"] {
            q0.push(label.to_string(), 1).await.unwrap();
        }
        assert_eq!(q1.size(1).await.unwrap(), 3);
        assert_eq!(q1.pop(1).await.unwrap(), (true, "a".to_string()));
        assert_eq!(q1.pop(1).await.unwrap(), (true, "b".to_string()));
        assert_eq!(q1.pop(1).await.unwrap(), (true, "c".to_string()));
        assert_eq!(q1.pop(1).await.unwrap(), (false, String::new()));
    }

    // ============================================================
    // SET
    // ============================================================

    #[tokio::test(flavor = "multi_thread")]
    async fn test_set_membership_across_servers() {
        let (services, groups) = simulated_job(2).await;
        let (s0, s1) = tokio::join!(
            Set::<String>::new(
                server_options("s1", 0, 2),
                services[0].clone(),
                groups[0].as_ref(),
            ),
            Set::<String>::new(
                server_options("s1", 1, 2),
                services[1].clone(),
                groups[1].as_ref(),
            ),
        );
        let s0 = s0.unwrap();
        let s1 = s1.unwrap();

        for i in 0..10 {
            assert!(s0.put(format!("member_{}", i)).await.unwrap());
        }

        assert!(s1.get(&"member_3".to_string()).await.unwrap());
        assert!(!s1.get(&"stranger".to_string()).await.unwrap());

        assert!(s1.erase(&"member_3".to_string()).await.unwrap());
        assert!(!s0.get(&"member_3".to_string()).await.unwrap());
        assert!(!s0.erase(&"member_3".to_string()).await.unwrap());

        let all = s0.get_all_data().await.unwrap();
        assert_eq!(all.len(), 9);
    }

    // ============================================================
    // MULTIMAP
    // ============================================================

    #[tokio::test(flavor = "multi_thread")]
    async fn test_multimap_keeps_every_value() {
        let (services, groups) = simulated_job(2).await;
        let (m0, m1) = tokio::join!(
            Multimap::<String, u64>::new(
                server_options("mm1", 0, 2),
                services[0].clone(),
                groups[0].as_ref(),
            ),
            Multimap::<String, u64>::new(
                server_options("mm1", 1, 2),
                services[1].clone(),
                groups[1].as_ref(),
            ),
        );
        let m0 = m0.unwrap();
        let m1 = m1.unwrap();

        m0.put("word".to_string(), 1).await.unwrap();
        m1.put("word".to_string(), 2).await.unwrap();
        m0.put("other".to_string(), 3).await.unwrap();

        // The oldest value wins the point lookup.
        assert_eq!(m1.get(&"word".to_string()).await.unwrap(), (true, 1));

        let all = m0.get_all_data().await.unwrap();
        let as_set: BTreeSet<_> = all.into_iter().collect();
        let expected: BTreeSet<_> = [
            ("word".to_string(), 1),
            ("word".to_string(), 2),
            ("other".to_string(), 3),
        ]
        .into_iter()
        .collect();
        assert_eq!(as_set, expected);

        assert_eq!(m0.erase(&"word".to_string()).await.unwrap(), (true, 0));
        assert_eq!(m1.get(&"word".to_string()).await.unwrap(), (false, 0));
    }

    // ============================================================
    // CONSTRUCTION ERRORS
    // ============================================================

    #[tokio::test(flavor = "multi_thread")]
    async fn test_mismatched_server_count_is_fatal() {
        let base_port = reserve_ports(2);
        let hosts = vec!["127.0.0.1".to_string(), "127.0.0.1".to_string()];
        let directory = ClusterDirectory::new(hosts, base_port, 0, false).unwrap();
        let service = RpcService::start(directory).await.unwrap();
        let group = ProcessGroup::group(1);

        let result = UnorderedMap::<u64, u64>::new(
            ContainerOptions::new("bad_n").with_num_servers(3),
            service,
            group[0].as_ref(),
        )
        .await;
        assert!(matches!(result, Err(ShardboxError::Config(_))));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_colliding_collection_names_are_fatal() {
        let (services, groups) = simulated_job(1).await;

        let _first = UnorderedMap::<u64, u64>::new(
            server_options("twice", 0, 1),
            services[0].clone(),
            groups[0].as_ref(),
        )
        .await
        .unwrap();

        let second = UnorderedMap::<u64, u64>::new(
            server_options("twice", 0, 1),
            services[0].clone(),
            groups[0].as_ref(),
        )
        .await;
        assert!(matches!(second, Err(ShardboxError::Config(_))));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_server_on_node_requires_a_hosted_shard() {
        let base_port = reserve_ports(1);
        let directory =
            ClusterDirectory::new(vec!["127.0.0.1".to_string()], base_port, 0, false).unwrap();
        let service = RpcService::start(directory).await.unwrap();
        let group = ProcessGroup::group(1);

        let result = UnorderedMap::<u64, u64>::new(
            ContainerOptions::new("fastpath").with_server_on_node(true),
            service,
            group[0].as_ref(),
        )
        .await;
        assert!(matches!(result, Err(ShardboxError::Config(_))));
    }

    // ============================================================
    // MULTIPLE COLLECTIONS, ONE SERVICE
    // ============================================================

    #[tokio::test(flavor = "multi_thread")]
    async fn test_collections_multiplex_over_one_service() {
        let (services, groups) = simulated_job(2).await;

        let (m0, m1) = tokio::join!(
            UnorderedMap::<String, u64>::new(
                server_options("meta", 0, 2),
                services[0].clone(),
                groups[0].as_ref(),
            ),
            UnorderedMap::<String, u64>::new(
                server_options("meta", 1, 2),
                services[1].clone(),
                groups[1].as_ref(),
            ),
        );
        let m0 = m0.unwrap();
        let m1 = m1.unwrap();

        let (w0, w1) = tokio::join!(
            PriorityQueue::<u64>::new(
                server_options("work", 0, 2),
                services[0].clone(),
                groups[0].as_ref(),
            ),
            PriorityQueue::<u64>::new(
                server_options("work", 1, 2),
                services[1].clone(),
                groups[1].as_ref(),
            ),
        );
        let w0 = w0.unwrap();
        let w1 = w1.unwrap();

        // Both collections answer over the same listeners without
        // interfering: handler names are prefixed by collection.
        m0.put("jobs_submitted".to_string(), 2).await.unwrap();
        w1.push(11, 0).await.unwrap();
        w0.push(12, 1).await.unwrap();

        assert_eq!(
            m1.get(&"jobs_submitted".to_string()).await.unwrap(),
            (true, 2)
        );
        assert_eq!(w0.pop(0).await.unwrap(), (true, 11));
        assert_eq!(w1.pop(1).await.unwrap(), (true, 12));
    }
}
