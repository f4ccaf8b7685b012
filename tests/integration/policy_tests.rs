//! Edge-policy behavior observed through the written files.

use tilecut::{read_baseline, EdgePolicy, TileRequest};

use super::test_utils::{pixel, read_tiles, run_into_dir, MemSource};

#[tokio::test]
async fn test_fit_shrinks_tiles_to_cover() {
    let tmp = tempfile::tempdir().unwrap();
    run_into_dir(
        MemSource::single(30, 15),
        TileRequest::new(12, 7).with_policy(EdgePolicy::Fit),
        tmp.path(),
    )
    .await;

    let tiles = read_tiles(tmp.path());
    assert_eq!(tiles.len(), 9);
    for (_, bytes) in &tiles {
        let tiff = read_baseline(bytes).unwrap();
        // 30/3 and 15/3 divide evenly, so every tile is exactly 10x5.
        assert_eq!((tiff.width, tiff.height), (10, 5));
    }
}

#[tokio::test]
async fn test_skip_drops_truncated_edge_tiles() {
    let tmp = tempfile::tempdir().unwrap();
    let summary = run_into_dir(
        MemSource::single(30, 15),
        TileRequest::new(12, 7).with_policy(EdgePolicy::Skip),
        tmp.path(),
    )
    .await;
    assert_eq!(summary.tiles_written, 4);
    assert_eq!(summary.tiles_skipped, 5);

    let tiles = read_tiles(tmp.path());
    assert_eq!(tiles.len(), 4);
    for (id, bytes) in &tiles {
        let tiff = read_baseline(bytes).unwrap();
        // No emitted tile is ever smaller than the nominal size.
        assert_eq!((tiff.width, tiff.height), (12, 7));
        // And nothing near the dropped right/bottom edges was written.
        assert!(id.x_origin + 12 <= 30);
        assert!(id.y_origin + 7 <= 15);
        for row in 0..7u32 {
            for col in 0..12u32 {
                assert_eq!(
                    tiff.samples[(row * 12 + col) as usize],
                    pixel(0, 0, id.x_origin + col, id.y_origin + row)
                );
            }
        }
    }
}

#[tokio::test]
async fn test_pad_fills_edge_tiles_with_zeros() {
    let tmp = tempfile::tempdir().unwrap();
    let summary = run_into_dir(
        MemSource::single(30, 15),
        TileRequest::new(12, 7).with_policy(EdgePolicy::Pad),
        tmp.path(),
    )
    .await;
    assert_eq!(summary.tiles_written, 9);
    assert_eq!(summary.tiles_skipped, 0);

    for (id, bytes) in read_tiles(tmp.path()) {
        let tiff = read_baseline(&bytes).unwrap();
        // Every output buffer is exactly the nominal size.
        assert_eq!((tiff.width, tiff.height), (12, 7));
        assert_eq!(tiff.samples.len(), 84);

        let real_w = (30 - id.x_origin).min(12);
        let real_h = (15 - id.y_origin).min(7);
        for row in 0..7u32 {
            for col in 0..12u32 {
                let value = tiff.samples[(row * 12 + col) as usize];
                if col < real_w && row < real_h {
                    assert_eq!(value, pixel(0, 0, id.x_origin + col, id.y_origin + row));
                } else {
                    assert_eq!(value, 0, "pad byte not zero at ({col}, {row})");
                }
            }
        }
    }
}
