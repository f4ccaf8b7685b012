//! End-to-end pipeline tests: run into a real directory, re-read the TIFF
//! files and compare against the synthesized source plane.

use std::collections::HashSet;

use image::{GrayImage, Luma};

use tilecut::{
    read_baseline, DecodedImageSource, ImageGeometry, TileGrid, TileRequest,
    TiffDirectorySink, TilingPipeline,
};

use super::test_utils::{pixel, read_tiles, run_into_dir, MemSource};

#[tokio::test]
async fn test_single_tile_covers_whole_plane() {
    let tmp = tempfile::tempdir().unwrap();
    let summary = run_into_dir(
        MemSource::single(20, 10),
        TileRequest::new(20, 10),
        tmp.path(),
    )
    .await;
    assert_eq!(summary.tiles_written, 1);

    let tiles = read_tiles(tmp.path());
    assert_eq!(tiles.len(), 1);
    let (id, bytes) = &tiles[0];
    assert_eq!((id.x_origin, id.y_origin, id.series, id.plane), (0, 0, 0, 0));

    let tiff = read_baseline(bytes).unwrap();
    assert_eq!((tiff.width, tiff.height), (20, 10));
    for y in 0..10u32 {
        for x in 0..20u32 {
            assert_eq!(tiff.samples[(y * 20 + x) as usize], pixel(0, 0, x, y));
        }
    }
}

#[tokio::test]
async fn test_written_files_match_planned_grid() {
    let tmp = tempfile::tempdir().unwrap();
    let request = TileRequest::new(12, 7);
    run_into_dir(MemSource::single(30, 15), request, tmp.path()).await;

    let grid = TileGrid::plan(ImageGeometry::new(30, 15), request).unwrap();
    let expected: HashSet<(u32, u32)> = grid
        .emitted()
        .map(|t| (t.x_origin, t.y_origin))
        .collect();
    let written: HashSet<(u32, u32)> = read_tiles(tmp.path())
        .iter()
        .map(|(id, _)| (id.x_origin, id.y_origin))
        .collect();
    assert_eq!(expected, written);
}

#[tokio::test]
async fn test_tiles_reassemble_plane_byte_for_byte() {
    let tmp = tempfile::tempdir().unwrap();
    run_into_dir(
        MemSource::single(30, 15),
        TileRequest::new(12, 7),
        tmp.path(),
    )
    .await;

    let mut reassembled = vec![None::<u8>; 30 * 15];
    for (id, bytes) in read_tiles(tmp.path()) {
        let tiff = read_baseline(&bytes).unwrap();
        for row in 0..tiff.height {
            for col in 0..tiff.width {
                let value = tiff.samples[(row * tiff.width + col) as usize];
                let at = ((id.y_origin + row) * 30 + id.x_origin + col) as usize;
                reassembled[at] = Some(value);
            }
        }
    }
    for (at, value) in reassembled.iter().enumerate() {
        let (x, y) = (at as u32 % 30, at as u32 / 30);
        assert_eq!(value.expect("gap in coverage"), pixel(0, 0, x, y));
    }
}

/// Walk the grid the way a consumer would: step by each file's size minus
/// the overlap, without consulting the planner at all.
#[tokio::test]
async fn test_overlap_walk_reaches_every_tile() {
    let tmp = tempfile::tempdir().unwrap();
    let (width, height, overlap) = (58u32, 28u32, 2u32);
    run_into_dir(
        MemSource::single(width, height),
        TileRequest::new(20, 10).with_overlap(overlap),
        tmp.path(),
    )
    .await;

    let mut remaining: std::collections::HashMap<(u32, u32), Vec<u8>> = read_tiles(tmp.path())
        .into_iter()
        .map(|(id, bytes)| ((id.x_origin, id.y_origin), bytes))
        .collect();

    let mut x = 0;
    while x < width - overlap {
        let mut size_x = 0;
        let mut y = 0;
        while y < height - overlap {
            let bytes = remaining
                .remove(&(x, y))
                .unwrap_or_else(|| panic!("missing tile at ({x}, {y})"));
            let tiff = read_baseline(&bytes).unwrap();
            size_x = tiff.width;
            assert!(x + tiff.width <= width);
            assert!(y + tiff.height <= height);
            for row in 0..tiff.height {
                for col in 0..tiff.width {
                    assert_eq!(
                        tiff.samples[(row * tiff.width + col) as usize],
                        pixel(0, 0, x + col, y + row)
                    );
                }
            }
            y += tiff.height - overlap;
        }
        x += size_x - overlap;
    }
    assert!(remaining.is_empty(), "unvisited tiles: {:?}", remaining.keys());
}

#[tokio::test]
async fn test_multi_series_stacks_name_every_plane() {
    let tmp = tempfile::tempdir().unwrap();
    let summary = run_into_dir(
        MemSource::with_layout(vec![(20, 10, 3), (20, 10, 2)]),
        TileRequest::new(10, 5),
        tmp.path(),
    )
    .await;
    assert_eq!(summary.series, 2);
    assert_eq!(summary.planes, 5);
    assert_eq!(summary.tiles_written, 4 * 5);

    let tiles = read_tiles(tmp.path());
    assert_eq!(tiles.len(), 20);
    let keys: HashSet<_> = tiles
        .iter()
        .map(|(id, _)| (id.series, id.plane, id.x_origin, id.y_origin))
        .collect();
    assert_eq!(keys.len(), 20);

    // Spot-check a plane from the second series carries its own pixels.
    let (_, bytes) = tiles
        .iter()
        .find(|(id, _)| id.series == 1 && id.plane == 1 && id.x_origin == 10 && id.y_origin == 5)
        .unwrap();
    let tiff = read_baseline(bytes).unwrap();
    assert_eq!(tiff.samples[0], pixel(1, 1, 10, 5));
}

#[tokio::test]
async fn test_decoded_png_input_end_to_end() {
    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("gradient.png");
    GrayImage::from_fn(30, 15, |x, y| Luma([(x * 5 + y * 3) as u8]))
        .save(&input)
        .unwrap();

    let source = DecodedImageSource::open(&input).unwrap();
    let sink = TiffDirectorySink::create(tmp.path().join("tiles"), "gradient")
        .await
        .unwrap();
    let summary = TilingPipeline::new(source, sink, TileRequest::new(12, 7))
        .run()
        .await
        .unwrap();
    assert_eq!(summary.tiles_written, 9);

    let mut reassembled = vec![0u8; 30 * 15];
    for (id, bytes) in read_tiles(&tmp.path().join("tiles")) {
        let tiff = read_baseline(&bytes).unwrap();
        for row in 0..tiff.height {
            for col in 0..tiff.width {
                reassembled[((id.y_origin + row) * 30 + id.x_origin + col) as usize] =
                    tiff.samples[(row * tiff.width + col) as usize];
            }
        }
    }
    for y in 0..15u32 {
        for x in 0..30u32 {
            assert_eq!(reassembled[(y * 30 + x) as usize], (x * 5 + y * 3) as u8);
        }
    }
}
