//! Static sample graphs in the 2-D plane.
//!
//! Each fixture declares only the layer a point was inserted at; the builder
//! lifts points that own edges on higher layers. All fixtures have 3 layers.

use crate::error::Result;
use crate::graph::{GraphBuilder, LayeredGraph};
use crate::point::{Edge, Point};

/// A named sample graph.
#[derive(Clone, Debug)]
pub struct Fixture {
    pub name: &'static str,
    pub description: &'static str,
    pub graph: LayeredGraph,
}

/// `(id, x, y, insertion layer)`
type PlanarPoint = (u64, f32, f32, usize);

fn planar(points: &[PlanarPoint]) -> impl Iterator<Item = Point> + '_ {
    points
        .iter()
        .map(|&(id, x, y, layer)| Point::planar(id, x, y, layer))
}

fn at_layer(layer: usize, pairs: &[(u64, u64)]) -> impl Iterator<Item = Edge> + '_ {
    pairs.iter().map(move |&(a, b)| Edge::new(a, b, layer))
}

/// Every pair of `ids` connected at `layer`.
fn clique(ids: &[u64], layer: usize) -> Vec<Edge> {
    let mut edges = Vec::new();
    for (i, &a) in ids.iter().enumerate() {
        for &b in &ids[i + 1..] {
            edges.push(Edge::new(a, b, layer));
        }
    }
    edges
}

/// "Modelo Simple": 9 points, entry 0 on top, hubs 1 and 2, six leaves.
pub fn simple() -> Result<LayeredGraph> {
    let labels = [
        "Entry", "Hub A", "Hub B", "Node 1", "Node 2", "Node 3", "Node 4", "Node 5", "Node 6",
    ];
    let points: [PlanarPoint; 9] = [
        (0, 200.0, 150.0, 2),
        (1, 100.0, 100.0, 1),
        (2, 300.0, 100.0, 1),
        (3, 50.0, 50.0, 0),
        (4, 150.0, 50.0, 0),
        (5, 250.0, 50.0, 0),
        (6, 350.0, 50.0, 0),
        (7, 75.0, 200.0, 0),
        (8, 325.0, 200.0, 0),
    ];

    GraphBuilder::new()
        .points(planar(&points).zip(labels).map(|(p, l)| p.with_label(l)))
        .edges(at_layer(2, &[(0, 1), (0, 2)]))
        .edges(at_layer(1, &[(1, 2), (1, 3), (1, 4), (2, 5), (2, 6)]))
        .edges(at_layer(
            0,
            &[(3, 4), (4, 5), (5, 6), (3, 7), (6, 8), (1, 7), (2, 8)],
        ))
        .layers(3)
        .entry_point(0)
        .build()
}

/// Three tight clusters of three leaves, each hanging off its own hub.
pub fn clusters() -> Result<LayeredGraph> {
    let points: [PlanarPoint; 13] = [
        (9, 200.0, 125.0, 2),
        (10, 100.0, 75.0, 1),
        (11, 300.0, 75.0, 1),
        (12, 200.0, 200.0, 1),
        (13, 80.0, 60.0, 0),
        (14, 120.0, 60.0, 0),
        (15, 100.0, 100.0, 0),
        (16, 280.0, 60.0, 0),
        (17, 320.0, 60.0, 0),
        (18, 300.0, 100.0, 0),
        (19, 180.0, 180.0, 0),
        (20, 220.0, 180.0, 0),
        (21, 200.0, 220.0, 0),
    ];

    GraphBuilder::new()
        .points(planar(&points))
        .edges(at_layer(2, &[(9, 10), (9, 11), (9, 12)]))
        .edges(at_layer(1, &[(10, 11), (10, 12), (11, 12)]))
        .edges(at_layer(
            0,
            &[
                (13, 14),
                (13, 15),
                (14, 15),
                (10, 13),
                (10, 15),
                (16, 17),
                (16, 18),
                (17, 18),
                (11, 16),
                (11, 18),
                (19, 20),
                (19, 21),
                (20, 21),
                (12, 19),
                (12, 21),
                (10, 11),
                (11, 12),
                (12, 10),
            ],
        ))
        .layers(3)
        .entry_point(9)
        .build()
}

/// The textbook picture: one entry, five hubs, seventeen densely linked leaves.
pub fn classic() -> Result<LayeredGraph> {
    let mut points: Vec<Point> = vec![Point::planar(1, 400.0, 200.0, 2).with_label("Entry")];

    let hubs: [(f32, f32); 5] = [
        (200.0, 150.0),
        (600.0, 150.0),
        (400.0, 350.0),
        (300.0, 100.0),
        (500.0, 100.0),
    ];
    for (i, &(x, y)) in hubs.iter().enumerate() {
        points.push(Point::planar(2 + i as u64, x, y, 1).with_label(format!("H{}", i + 1)));
    }

    let leaves: [(f32, f32); 17] = [
        (150.0, 100.0),
        (250.0, 80.0),
        (350.0, 80.0),
        (450.0, 80.0),
        (550.0, 80.0),
        (650.0, 100.0),
        (100.0, 200.0),
        (200.0, 220.0),
        (300.0, 200.0),
        (400.0, 220.0),
        (500.0, 200.0),
        (600.0, 220.0),
        (700.0, 200.0),
        (250.0, 320.0),
        (350.0, 380.0),
        (450.0, 380.0),
        (550.0, 320.0),
    ];
    for (i, &(x, y)) in leaves.iter().enumerate() {
        points.push(Point::planar(7 + i as u64, x, y, 0).with_label(format!("N{}", i + 1)));
    }

    GraphBuilder::new()
        .points(points)
        .edges(at_layer(2, &[(1, 2), (1, 3), (1, 4)]))
        .edges(at_layer(
            1,
            &[
                (2, 3),
                (2, 4),
                (2, 5),
                (3, 4),
                (3, 6),
                (4, 5),
                (4, 6),
                (5, 6),
                (1, 5),
                (1, 6),
            ],
        ))
        .edges(at_layer(
            0,
            &[
                // leaf mesh
                (7, 8),
                (8, 9),
                (9, 10),
                (10, 11),
                (11, 12),
                (7, 13),
                (8, 14),
                (9, 15),
                (10, 16),
                (11, 17),
                (12, 18),
                (13, 14),
                (14, 15),
                (15, 16),
                (16, 17),
                (17, 18),
                (18, 19),
                (14, 20),
                (20, 21),
                (21, 22),
                (22, 23),
                (17, 23),
                (8, 15),
                (15, 20),
                (10, 17),
                (16, 22),
                (7, 14),
                (9, 16),
                (11, 18),
                (15, 21),
                (17, 22),
                // hubs down to their leaves
                (2, 7),
                (2, 8),
                (2, 13),
                (2, 14),
                (3, 11),
                (3, 12),
                (3, 17),
                (3, 18),
                (4, 20),
                (4, 21),
                (4, 22),
                (5, 8),
                (5, 9),
                (5, 15),
                (6, 10),
                (6, 11),
                (6, 16),
                (6, 17),
            ],
        ))
        .layers(3)
        .entry_point(1)
        .build()
}

/// Three fully connected groups of four, bridged only through their hubs.
pub fn clustered() -> Result<LayeredGraph> {
    let points: [PlanarPoint; 16] = [
        (0, 400.0, 300.0, 2),
        (1, 200.0, 200.0, 1),
        (2, 600.0, 200.0, 1),
        (3, 400.0, 500.0, 1),
        (4, 150.0, 150.0, 0),
        (5, 180.0, 180.0, 0),
        (6, 220.0, 160.0, 0),
        (7, 170.0, 220.0, 0),
        (8, 580.0, 180.0, 0),
        (9, 620.0, 160.0, 0),
        (10, 600.0, 220.0, 0),
        (11, 640.0, 200.0, 0),
        (12, 380.0, 480.0, 0),
        (13, 420.0, 520.0, 0),
        (14, 360.0, 520.0, 0),
        (15, 440.0, 480.0, 0),
    ];

    GraphBuilder::new()
        .points(planar(&points))
        .edges(at_layer(2, &[(0, 1), (0, 2), (0, 3)]))
        .edges(at_layer(1, &[(1, 2), (1, 3), (2, 3), (1, 4), (2, 8), (3, 12)]))
        .edges(clique(&[4, 5, 6, 7], 0))
        .edges(clique(&[8, 9, 10, 11], 0))
        .edges(clique(&[12, 13, 14, 15], 0))
        .edges(at_layer(0, &[(1, 8), (2, 12), (3, 4)]))
        .layers(3)
        .entry_point(0)
        .build()
}

/// Points spread evenly over the plane with sparse local links.
pub fn uniform() -> Result<LayeredGraph> {
    let points: [PlanarPoint; 17] = [
        (16, 400.0, 300.0, 2),
        (17, 250.0, 250.0, 1),
        (18, 550.0, 250.0, 1),
        (19, 400.0, 150.0, 1),
        (20, 400.0, 450.0, 1),
        (21, 150.0, 200.0, 0),
        (22, 300.0, 100.0, 0),
        (23, 500.0, 120.0, 0),
        (24, 650.0, 180.0, 0),
        (25, 180.0, 350.0, 0),
        (26, 320.0, 380.0, 0),
        (27, 480.0, 400.0, 0),
        (28, 620.0, 350.0, 0),
        (29, 350.0, 250.0, 0),
        (30, 450.0, 280.0, 0),
        (31, 200.0, 450.0, 0),
        (32, 600.0, 480.0, 0),
    ];

    GraphBuilder::new()
        .points(planar(&points))
        .edges(at_layer(2, &[(16, 17), (16, 18), (16, 19), (16, 20)]))
        .edges(clique(&[17, 18, 19, 20], 1))
        .edges(at_layer(
            0,
            &[
                (21, 17),
                (21, 25),
                (22, 19),
                (22, 29),
                (23, 19),
                (23, 30),
                (24, 18),
                (24, 28),
                (25, 17),
                (25, 31),
                (26, 20),
                (26, 29),
                (27, 20),
                (27, 30),
                (28, 18),
                (28, 32),
                (29, 30),
                (29, 17),
                (30, 18),
                (31, 32),
                (31, 26),
                (32, 27),
            ],
        ))
        .layers(3)
        .entry_point(16)
        .build()
}

/// Every fixture, in menu order.
pub fn all() -> Result<Vec<Fixture>> {
    Ok(vec![
        Fixture {
            name: "simple",
            description: "Modelo Simple: 9 points, two hubs",
            graph: simple()?,
        },
        Fixture {
            name: "clusters",
            description: "three small clusters under one entry",
            graph: clusters()?,
        },
        Fixture {
            name: "classic",
            description: "one entry, five hubs, seventeen leaves",
            graph: classic()?,
        },
        Fixture {
            name: "clustered",
            description: "three cliques bridged through hubs",
            graph: clustered()?,
        },
        Fixture {
            name: "uniform",
            description: "evenly spread points",
            graph: uniform()?,
        },
    ])
}
