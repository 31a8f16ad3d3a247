// Copyright (C) 2023 tessella contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::io::{BufRead, Write};

use super::*;

/// Raised when an OFF input does not begin with the `OFF` magic line.
#[derive(Copy, Clone, Debug)]
pub struct IncorrectHeader;

impl std::fmt::Display for IncorrectHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Incorrect file header: unable to parse OFF file")
    }
}
impl std::error::Error for IncorrectHeader {}

/// Reads an OFF file: the `OFF` magic, a `numVertices numFaces numEdges`
/// line, `numVertices` lines of `x y [z]` (z ignored), then `numFaces` lines
/// of `k v0 .. v{k-1}` with 0-indexed ccw vertex indices. Blank lines and
/// `#` comments are skipped anywhere; the edge count is not validated.
pub fn parse_off(reader: impl BufRead) -> Result<(Vec<Point>, Vec<Vec<usize>>)> {
    let mut points: Vec<Point> = Vec::new();
    let mut faces: Vec<Vec<usize>> = Vec::new();
    let mut num_points = 0usize;
    let mut num_faces = 0usize;
    // Stages: 0 header, 1 counts, 2 vertices, 3 faces, 4 done.
    let mut stage = 0;
    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        match stage {
            0 => {
                if trimmed.split_whitespace().next() != Some("OFF") {
                    return Err(IncorrectHeader.into());
                }
                stage = 1;
            }
            1 => {
                let mut fields = trimmed.split_whitespace();
                num_points = fields
                    .next()
                    .context("OFF count line is missing the vertex count")?
                    .parse()
                    .context("Malformed vertex count")?;
                num_faces = fields
                    .next()
                    .context("OFF count line is missing the face count")?
                    .parse()
                    .context("Malformed face count")?;
                // The edge count is present but not validated.
                let _num_edges = fields.next();
                points.reserve(num_points);
                faces.reserve(num_faces);
                stage = 2;
            }
            2 => {
                let mut fields = trimmed.split_whitespace();
                let x: f64 = fields
                    .next()
                    .context("Vertex line is missing x")?
                    .parse()
                    .context("Malformed vertex coordinate")?;
                let y: f64 = fields
                    .next()
                    .context("Vertex line is missing y")?
                    .parse()
                    .context("Malformed vertex coordinate")?;
                points.push(Point::new(x, y));
                if points.len() == num_points {
                    stage = 3;
                }
            }
            3 => {
                let mut fields = trimmed.split_whitespace();
                let k: usize = fields
                    .next()
                    .context("Face line is missing its vertex count")?
                    .parse()
                    .context("Malformed face vertex count")?;
                let face = fields
                    .take(k)
                    .map(|f| f.parse::<usize>().context("Malformed face vertex index"))
                    .collect::<Result<Vec<_>>>()?;
                if face.len() != k {
                    bail!("Face line promises {k} vertices but lists {}", face.len());
                }
                faces.push(face);
                if faces.len() == num_faces {
                    stage = 4;
                }
            }
            _ => break,
        }
        // Degenerate counts skip over their stages.
        if stage == 2 && num_points == 0 {
            stage = 3;
        }
        if stage == 3 && num_faces == 0 {
            stage = 4;
        }
        if stage == 4 {
            break;
        }
    }
    if stage != 4 {
        bail!("OFF file ended before {num_points} vertices and {num_faces} faces were read");
    }
    Ok((points, faces))
}

/// Reads a PT file: one `x y` per line until end of input, with no count
/// prefix. Blank lines are skipped.
pub fn parse_pt(reader: impl BufRead) -> Result<Vec<Point>> {
    let mut points = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let mut fields = trimmed.split_whitespace();
        let x: f64 = fields
            .next()
            .context("Point line is missing x")?
            .parse()
            .context("Malformed point coordinate")?;
        let y: f64 = fields
            .next()
            .context("Point line is missing y")?
            .parse()
            .context("Malformed point coordinate")?;
        points.push(Point::new(x, y));
    }
    Ok(points)
}

impl Subdivision {
    /// Builds this subdivision from OFF text.
    pub fn read_off(&mut self, reader: impl BufRead) -> Result<HalfEdgeId> {
        let (points, faces) = parse_off(reader)?;
        self.init_subdivision(&points, &faces)
    }

    /// Writes this subdivision as OFF text, reconstructing faces by dual
    /// traversal. Each face is rotated to start at its smallest vertex
    /// label, which makes write-read-write round trips textually stable.
    pub fn write_off(&self, writer: &mut impl Write) -> Result<()> {
        if self.incident_edge().is_none() {
            writeln!(writer, "OFF")?;
            writeln!(writer, "0 0 0")?;
            return Ok(());
        }
        let conn = self.conn();
        let primal_nodes = self.traverse(GraphKind::Primal, TraversalKind::Nodes);
        let dual_nodes = self.traverse(GraphKind::Dual, TraversalKind::Nodes);
        let num_edges = self.traverse(GraphKind::Primal, TraversalKind::Edges).len();
        let num_points = primal_nodes.len();
        let num_faces = dual_nodes.len() - 1;

        let mut points = vec![Point::ZERO; num_points];
        for e in primal_nodes {
            let vertex = &conn[conn.origin(e)];
            let label = vertex.label() as usize;
            debug_assert!(label < num_points, "vertex labels must be contiguous");
            points[label] = vertex.position().expect("Primal vertex should have a position");
        }

        let mut faces = vec![Vec::new(); num_faces + 1];
        for e in dual_nodes {
            let index = conn[conn.origin(e)].label();
            if index == 0 {
                continue;
            }
            debug_assert!(index >= 1 && index as usize <= num_faces, "face labels must be contiguous");
            let face: Vec<i64> = conn
                .ring(conn.rot(e), IncidenceMode::OnFace)
                .map(|f| conn[conn.origin(f)].label())
                .collect();
            let min_at = face
                .iter()
                .position_min()
                .expect("Face ring should not be empty");
            faces[index as usize] = rotate_iter(face.iter_cpy(), min_at, face.len()).collect();
        }

        writeln!(writer, "OFF")?;
        writeln!(writer, "{} {} {}", num_points, num_faces, num_edges)?;
        for p in &points {
            writeln!(writer, "{} {}", p.x, p.y)?;
        }
        for face in &faces[1..] {
            write!(writer, "{}", face.len())?;
            for index in face {
                write!(writer, " {index}")?;
            }
            writeln!(writer)?;
        }
        Ok(())
    }
}
