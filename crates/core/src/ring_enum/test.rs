use super::*;
use peersel_test_utils::directory::FaultyDirectory;
use peersel_test_utils::peer::PeerBuilder;

use crate::factories::mem_directory::MemDirectory;

fn directory_with(peers: &[u32]) -> DynDirectory {
    let d = MemDirectory::create(PeerBuilder::at_tagged(0, 0xee).build());
    d.insert(peers.iter().map(|l| PeerBuilder::at(*l).build()).collect())
        .unwrap();
    d
}

fn walk(d: &DynDirectory, start: Option<u32>) -> Vec<u32> {
    RingEnum::new(d.clone(), start, ProtocolVersion::ANY)
        .map(|r| r.unwrap().loc())
        .collect()
}

#[test]
fn walks_clockwise_and_wraps_once() {
    let d = directory_with(&[10, 20, 30, 40]);

    assert_eq!(vec![10, 20, 30, 40], walk(&d, None));
    assert_eq!(vec![10, 20, 30, 40], walk(&d, Some(0)));
    assert_eq!(vec![30, 40, 10, 20], walk(&d, Some(25)));
    assert_eq!(vec![20, 30, 40, 10], walk(&d, Some(20)));
    assert_eq!(vec![10, 20, 30, 40], walk(&d, Some(45)));
    assert_eq!(vec![10, 20, 30, 40], walk(&d, Some(u32::MAX)));
}

#[test]
fn empty_directory_yields_nothing() {
    let d = directory_with(&[]);
    assert!(walk(&d, None).is_empty());
    assert!(walk(&d, Some(7)).is_empty());
}

#[test]
fn rotation_is_bounded_by_connected_count() {
    let d = directory_with(&[10, 20, 30]);
    let mut e = RingEnum::new(d.clone(), Some(15), ProtocolVersion::ANY);
    assert_eq!(3, e.remaining());

    assert_eq!(20, e.next().unwrap().unwrap().loc());
    d.insert(vec![PeerBuilder::at(25).build(), PeerBuilder::at(5).build()])
        .unwrap();

    let rest: Vec<u32> = e.by_ref().map(|r| r.unwrap().loc()).collect();
    assert_eq!(vec![25, 30], rest);
    assert_eq!(0, e.remaining());
    assert!(e.next().is_none());
}

#[test]
fn second_half_stops_at_start() {
    let d = directory_with(&[10, 20, 30]);
    let mut e = RingEnum::new(d.clone(), Some(15), ProtocolVersion::ANY);

    assert_eq!(20, e.next().unwrap().unwrap().loc());
    assert_eq!(30, e.next().unwrap().unwrap().loc());
    assert_eq!(1, e.remaining());
    // the budget would allow one more, but 17 lies past the start again
    d.remove(&peersel_test_utils::id::peer_id_at(10, 0));
    d.insert(vec![PeerBuilder::at(17).build()]).unwrap();

    assert!(e.next().is_none());
    assert_eq!(1, e.remaining());
}

#[test]
fn old_versions_are_not_charged() {
    let d = MemDirectory::create(PeerBuilder::at_tagged(0, 0xee).build());
    d.insert(vec![
        PeerBuilder::at(10).with_version(ProtocolVersion(100)).build(),
        PeerBuilder::at(20).build(),
        PeerBuilder::at(30).build(),
    ])
    .unwrap();

    let got: Vec<u32> = RingEnum::new(
        d.clone(),
        Some(25),
        ProtocolVersion::HANDLES_COLLECTION_INDEX,
    )
    .map(|r| r.unwrap().loc())
    .collect();
    assert_eq!(vec![30, 20], got);
}

#[test]
fn fault_is_yielded_once() {
    let d = directory_with(&[10, 20, 30]);
    let faulty: DynDirectory = FaultyDirectory::create(d, 1);

    let mut e = RingEnum::new(faulty, None, ProtocolVersion::ANY);
    assert_eq!(10, e.next().unwrap().unwrap().loc());
    assert!(e.next().unwrap().unwrap_err().is_inconsistent());
    assert!(e.next().is_none());
}
