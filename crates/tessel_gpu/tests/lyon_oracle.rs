//! Cross-check fill and stroke coverage against lyon's tessellators

use lyon::lyon_tessellation::{
    BuffersBuilder, FillOptions, FillTessellator, FillVertex, LineCap as LyonCap, StrokeOptions,
    StrokeTessellator, StrokeVertex, VertexBuffers,
};
use lyon::math::point;
use lyon::path::Path;
use tessel_gpu::{build_line, earcut, LineStyle};
use tessel_paint::{LineCap, LineJoin};

fn area(vertices: &[[f32; 2]], indices: &[u32]) -> f64 {
    indices
        .chunks_exact(3)
        .map(|t| {
            let [a, b, c] = [t[0], t[1], t[2]].map(|i| vertices[i as usize]);
            let cross = (b[0] - a[0]) as f64 * (c[1] - a[1]) as f64
                - (c[0] - a[0]) as f64 * (b[1] - a[1]) as f64;
            cross.abs() / 2.0
        })
        .sum()
}

fn flat_to_pairs(points: &[f32]) -> Vec<[f32; 2]> {
    points.chunks_exact(2).map(|p| [p[0], p[1]]).collect()
}

fn lyon_fill_area(rings: &[&[f32]]) -> f64 {
    let mut builder = Path::builder();
    for ring in rings {
        builder.begin(point(ring[0], ring[1]));
        for p in ring[2..].chunks_exact(2) {
            builder.line_to(point(p[0], p[1]));
        }
        builder.end(true);
    }
    let path = builder.build();

    let mut geometry: VertexBuffers<[f32; 2], u32> = VertexBuffers::new();
    FillTessellator::new()
        .tessellate_path(
            &path,
            &FillOptions::default(),
            &mut BuffersBuilder::new(&mut geometry, |vertex: FillVertex| {
                vertex.position().to_array()
            }),
        )
        .expect("lyon fill");
    area(&geometry.vertices, &geometry.indices)
}

fn our_fill_area(rings: &[&[f32]]) -> f64 {
    let mut data = Vec::new();
    let mut holes = Vec::new();
    for (i, ring) in rings.iter().enumerate() {
        if i > 0 {
            holes.push(data.len() / 2);
        }
        data.extend_from_slice(ring);
    }
    let triangles = earcut(&data, &holes);
    area(&flat_to_pairs(&data), &triangles)
}

fn assert_same_fill(rings: &[&[f32]]) {
    let ours = our_fill_area(rings);
    let theirs = lyon_fill_area(rings);
    assert!(
        (ours - theirs).abs() <= 1e-3 * theirs.max(1.0),
        "ours {ours}, lyon {theirs}"
    );
}

#[test]
fn test_concave_star_matches_lyon() {
    let star: Vec<f32> = (0..10)
        .flat_map(|i| {
            let r = if i % 2 == 0 { 100.0 } else { 40.0 };
            let a = i as f32 * std::f32::consts::PI / 5.0;
            [r * a.cos(), r * a.sin()]
        })
        .collect();
    assert_same_fill(&[&star]);
}

#[test]
fn test_comb_matches_lyon() {
    let comb = [
        0.0, 0.0, 100.0, 0.0, 100.0, 60.0, 80.0, 60.0, 80.0, 20.0, 60.0, 20.0, 60.0, 60.0, 40.0,
        60.0, 40.0, 20.0, 20.0, 20.0, 20.0, 60.0, 0.0, 60.0,
    ];
    assert_same_fill(&[&comb]);
}

#[test]
fn test_polygon_with_holes_matches_lyon() {
    let outer = [0.0, 0.0, 200.0, 0.0, 200.0, 100.0, 0.0, 100.0];
    let left = [20.0, 20.0, 20.0, 80.0, 80.0, 80.0, 80.0, 20.0];
    let right = [120.0, 30.0, 150.0, 70.0, 180.0, 30.0];
    assert_same_fill(&[&outer, &left, &right]);
}

#[test]
fn test_large_ring_matches_lyon() {
    // Above the z-order threshold
    let wobbly: Vec<f32> = (0..300)
        .flat_map(|i| {
            let a = i as f32 / 300.0 * std::f32::consts::TAU;
            let r = 100.0 + 15.0 * (a * 7.0).sin();
            [r * a.cos(), r * a.sin()]
        })
        .collect();
    assert_same_fill(&[&wobbly]);
}

#[test]
fn test_straight_square_cap_stroke_matches_lyon() {
    let mut builder = Path::builder();
    builder.begin(point(0.0, 0.0));
    builder.line_to(point(120.0, 40.0));
    builder.end(false);
    let path = builder.build();

    let mut geometry: VertexBuffers<[f32; 2], u32> = VertexBuffers::new();
    StrokeTessellator::new()
        .tessellate_path(
            &path,
            &StrokeOptions::default()
                .with_line_width(8.0)
                .with_line_cap(LyonCap::Square),
            &mut BuffersBuilder::new(&mut geometry, |vertex: StrokeVertex| {
                vertex.position().to_array()
            }),
        )
        .expect("lyon stroke");
    let theirs = area(&geometry.vertices, &geometry.indices);

    let style = LineStyle {
        width: 8.0,
        cap: LineCap::Square,
        join: LineJoin::Miter,
        ..LineStyle::default()
    };
    let mut vertices = Vec::new();
    let mut indices = Vec::new();
    build_line(&[0.0, 0.0, 120.0, 40.0], &style, false, false, &mut vertices, &mut indices);
    let ours = area(&flat_to_pairs(&vertices), &indices);

    assert!((ours - theirs).abs() < 0.5, "ours {ours}, lyon {theirs}");
}
