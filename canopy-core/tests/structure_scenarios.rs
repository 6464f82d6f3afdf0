//! End-to-end scenarios for the index structure: chunk geometry across the
//! fixed and dynamic regimes, the chunk-number inverse, subset sharding,
//! and configuration rejection.

use canopy_core::{
    level_index, points_at_depth, BBox, Error, Id, Point, Structure, StructureConfig,
};

/// Octree, fixed chunks, bounded cold band, no sparse threshold.
fn octree_fixed() -> Structure {
    Structure::new(
        StructureConfig::octree()
            .with_null_depth(6)
            .with_base_depth(8)
            .with_cold_depth(12)
            .with_chunk_points(262_144)
            .with_dynamic_chunks(false),
    )
    .unwrap()
}

/// Quadtree, dynamic chunks, unbounded cold band, four-billion-point hint.
fn quadtree_dynamic() -> Structure {
    Structure::new(
        StructureConfig::quadtree()
            .with_null_depth(6)
            .with_base_depth(10)
            .with_cold_depth(0)
            .with_chunk_points(65_536)
            .with_num_points_hint(4_000_000_000),
    )
    .unwrap()
}

fn full_2d() -> BBox {
    BBox::new(Point::new(0.0, 0.0, 0.0), Point::new(16.0, 16.0, 0.0), false).unwrap()
}

#[test]
fn octree_fixed_chunk_geometry() {
    let s = octree_fixed();

    assert_eq!(s.factor(), 8);
    assert_eq!(s.nominal_chunk_depth(), 6);
    // levelIndex(8) = (8^8 - 1) / 7
    assert_eq!(s.cold_index_begin(), Id::new(2_396_745));

    let first = s.get_info(Id::new(2_396_745));
    assert_eq!(first.depth(), 8);
    assert_eq!(first.chunk_id(), Id::new(2_396_745));
    assert_eq!(first.chunk_num(), 0);
    assert_eq!(first.chunk_offset(), 0);
    assert_eq!(first.chunk_points(), 262_144);

    let second = s.get_info(Id::new(2_396_745 + 262_144));
    assert_eq!(second.chunk_num(), 1);
    assert_eq!(second.chunk_offset(), 0);
}

#[test]
fn fixed_chunks_never_resize() {
    let s = octree_fixed();
    let begin = s.cold_index_begin().as_simple();

    for offset in [0u64, 1, 262_143, 262_144, 10_000_000, 100_000_000] {
        let info = s.get_info(Id::new(begin + offset));
        assert_eq!(info.chunk_points(), 262_144, "offset {offset}");
    }
}

#[test]
fn quadtree_sparse_threshold() {
    let s = quadtree_dynamic();

    // 4^16 is the first depth capacity reaching four billion points, so the
    // sparse regime begins at 17.
    assert_eq!(s.sparse_depth_begin(), 17);
    assert_eq!(s.sparse_index_begin(), level_index(2, 17));
    assert_eq!(s.sparse_index_begin(), Id::new(5_726_623_061));

    // Chunk count per sparse depth: 4^17 / 65536.
    assert_eq!(s.num_chunks_at_depth(17), 262_144);
    assert_eq!(s.num_chunks_at_depth(30), 262_144);
}

#[test]
fn dynamic_chunks_grow_past_sparse() {
    let s = quadtree_dynamic();

    // Depth 17 is the last fixed depth.
    let at_17 = s.get_info(level_index(2, 17));
    assert_eq!(at_17.depth(), 17);
    assert_eq!(at_17.chunk_points(), 65_536);

    // One level past the threshold, chunks quadruple.
    let at_18 = s.get_info(level_index(2, 18));
    assert_eq!(at_18.depth(), 18);
    assert_eq!(at_18.chunk_points(), 262_144);

    let at_20 = s.get_info(level_index(2, 20));
    assert_eq!(at_20.chunk_points(), 65_536 * 4 * 4 * 4);
}

#[test]
fn chunk_location_invariants_hold_in_both_regimes() {
    let s = quadtree_dynamic();
    let begin = s.cold_index_begin().as_simple();
    let deep = level_index(2, 19).as_simple();

    let samples = [
        begin,
        begin + 1,
        begin + 65_535,
        begin + 65_536,
        begin + 9_999_999,
        deep,
        deep + 123_456,
        deep + 262_144 * 7 + 13,
    ];

    for &i in &samples {
        let index = Id::new(i);
        let info = s.get_info(index);

        assert!(info.chunk_offset() < info.chunk_points(), "index {i}");
        assert!(info.chunk_id() <= index, "index {i}");
        assert!(index < info.chunk_id() + info.chunk_points(), "index {i}");
        assert_eq!((index - info.chunk_id()).as_simple(), info.chunk_offset());
    }
}

#[test]
fn chunk_num_inverse_round_trip() {
    let s = quadtree_dynamic();

    // Chunks with the nominal size span the cold band through the first
    // sparse depth.
    let end_fixed = level_index(2, s.sparse_depth_begin() + 1);
    let fixed_num = ((end_fixed - s.cold_index_begin()) / 65_536).as_simple();
    assert_eq!(fixed_num, 349_520);

    let per_sparse_depth = s.num_chunks_at_depth(s.sparse_depth_begin());
    let samples = [
        0,
        1,
        255,
        per_sparse_depth,
        fixed_num - 1,
        fixed_num,
        fixed_num + 1,
        fixed_num + per_sparse_depth - 1,
        fixed_num + per_sparse_depth,
        fixed_num + 5 * per_sparse_depth + 77,
    ];

    for &n in &samples {
        let info = s.get_info_from_num(n);
        assert_eq!(info.chunk_num(), n, "chunk number {n}");
        assert_eq!(info.index(), info.chunk_id());
        assert_eq!(info.chunk_offset(), 0);
    }
}

#[test]
fn chunk_num_inverse_round_trip_fixed_octree() {
    let s = octree_fixed();

    // Total cold chunks over depths 8..12: sum of 8^d / 8^6.
    let total: u64 = (8..12).map(|d| points_at_depth(3, d).as_simple() / 262_144).sum();
    assert_eq!(total, 37_440);

    for n in [0, 1, 63, 64, 1_000, total - 1] {
        let info = s.get_info_from_num(n);
        assert_eq!(info.chunk_num(), n, "chunk number {n}");
    }
}

#[test]
fn first_sparse_chunk_sits_at_its_level_index() {
    let s = quadtree_dynamic();

    let end_fixed = level_index(2, s.sparse_depth_begin() + 1);
    let fixed_num = ((end_fixed - s.cold_index_begin()) / 65_536).as_simple();

    let info = s.get_info_from_num(fixed_num);
    assert_eq!(info.depth(), 18);
    assert_eq!(info.chunk_id(), level_index(2, 18));
    assert_eq!(info.chunk_points(), 262_144);
}

#[test]
fn metadata_round_trip() {
    for s in [octree_fixed(), quadtree_dynamic()] {
        let restored = Structure::from_json(s.to_json().unwrap()).unwrap();
        assert_eq!(restored, s);
    }

    let subset =
        Structure::new(StructureConfig::quadtree().with_subset(3, 16)).unwrap();
    let restored = Structure::from_json(subset.to_json().unwrap()).unwrap();
    assert_eq!(restored, subset);
    assert_eq!(restored.subset(), (3, 16));
}

#[test]
fn subset_bbox_walks_two_bits_per_step() {
    let s = Structure::new(StructureConfig::quadtree().with_subset(3, 16)).unwrap();
    let full = full_2d();

    // id = 3: step 0 reads 0b11 (sed), step 1 reads 0b00 (nwd).
    let bbox = s.subset_bbox(&full).unwrap();
    assert_eq!(bbox, full.go_sed().go_nwd());

    assert_eq!(s.subset_postfix(), "-3");
}

#[test]
fn subset_bbox_covers_an_even_share() {
    let full = full_2d();

    for splits in [4u64, 16, 64] {
        for id in 0..splits {
            // 4^6 points per chunk keeps the cold band divisible by every
            // split count.
            let s = Structure::new(
                StructureConfig::quadtree()
                    .with_chunk_points(4096)
                    .with_subset(id, splits),
            )
            .unwrap();

            let bbox = s.subset_bbox(&full).unwrap();
            assert!(full.contains(bbox.min()));
            let share = full.area() / splits as f64;
            assert!(
                (bbox.area() - share).abs() < 1e-9,
                "id {id} of {splits}"
            );
        }
    }
}

#[test]
fn octree_subset_split_is_rejected() {
    let s = Structure::new(StructureConfig::octree().with_subset(0, 4)).unwrap();
    let full = BBox::new(
        Point::new(0.0, 0.0, 0.0),
        Point::new(16.0, 16.0, 16.0),
        true,
    )
    .unwrap();

    assert!(matches!(
        s.subset_bbox(&full),
        Err(Error::UnsupportedSplit3d(_))
    ));
}

#[test]
fn invalid_configurations_are_rejected() {
    // Base band too shallow.
    assert!(Structure::new(
        StructureConfig::quadtree().with_null_depth(2).with_base_depth(3)
    )
    .is_err());

    // 1000 is not 4^n.
    assert!(
        Structure::new(StructureConfig::quadtree().with_chunk_points(1000)).is_err()
    );

    // Subset id out of range.
    assert!(Structure::new(StructureConfig::quadtree().with_subset(5, 4)).is_err());
}
