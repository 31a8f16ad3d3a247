use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use tessella_engine::subdivision::{HalfEdgeId, Subdivision};

const HELP: &str = "
Press:
T: to go to reverse edge
F: to move forward on the left face in ccw order
B: to move backward on the left face in ccw order
O: to rotate around the origin in ccw order
P: to rotate around the origin in cw order
R: to go to the dual edge from the right face to the left face
I: to go to the dual edge from the left face to the right face
S: to restart at the starting edge
1: to set the marker for edge 1 to the current edge
2: to set the marker for edge 2 to the current edge
J: to join edge 1 and edge 2 and go to the new edge (assuming they have the same left face)
D: to delete edge 1 from the plane (make sure that edge 1 is not the current edge)
C: to clear the screen
E: to exit
";

/// Drives a subdivision interactively: one single-letter command per line,
/// case-insensitive. Commands echo their effect; invalid input prints a
/// diagnostic and the tour continues.
pub fn run(sub: &mut Subdivision, input: impl BufRead, output: &mut impl Write) -> Result<()> {
    writeln!(output, "Tour started")?;
    writeln!(output, "Enter \"h\" for the help menu")?;

    let incident = sub
        .incident_edge()
        .context("The subdivision has no edges to tour")?;
    let mut curr = incident;
    let mut e1: Option<HalfEdgeId> = None;
    let mut e2: Option<HalfEdgeId> = None;

    let mut lines = input.lines();
    loop {
        writeln!(output, "Current edge: {}", sub.conn().describe_edge(curr))?;
        let Some(line) = lines.next() else { break };
        let line = line?;
        let Some(command) = line.trim().chars().next() else {
            continue;
        };
        match command.to_ascii_uppercase() {
            'T' => curr = sub.conn().twin(curr),
            'R' => curr = sub.conn().rot(curr),
            'I' => curr = sub.conn().invrot(curr),
            'F' => curr = sub.conn().fnext(curr),
            'B' => curr = sub.conn().fprev(curr),
            'O' => curr = sub.conn().onext(curr),
            'P' => curr = sub.conn().oprev(curr),
            'S' => curr = incident,
            '1' => {
                e1 = Some(curr);
                writeln!(output, "\nEdge 1 set to: {}\n", sub.conn().describe_edge(curr))?;
            }
            '2' => {
                e2 = Some(curr);
                writeln!(output, "\nEdge 2 set to: {}\n", sub.conn().describe_edge(curr))?;
            }
            'J' => {
                let (Some(a), Some(b)) = (e1, e2) else {
                    writeln!(output, "Mark edges 1 and 2 before joining")?;
                    continue;
                };
                if !sub.conn().contains_halfedge(a) || !sub.conn().contains_halfedge(b) {
                    writeln!(output, "A marked edge no longer exists")?;
                    continue;
                }
                writeln!(output, "What label do you want for the new left face?")?;
                let label = match lines.next() {
                    Some(line) => match line?.trim().parse::<i64>() {
                        Ok(label) => label,
                        Err(_) => {
                            writeln!(output, "Face labels are integers")?;
                            continue;
                        }
                    },
                    None => break,
                };
                curr = sub.conn_mut().connect(a, b, Some(label))?;
                e1 = None;
                e2 = None;
            }
            'D' => {
                let Some(doomed) = e1 else {
                    writeln!(output, "Mark edge 1 before deleting")?;
                    continue;
                };
                let quad_of = |e: HalfEdgeId| sub.conn()[e].quad();
                if quad_of(doomed) == quad_of(curr) || quad_of(doomed) == quad_of(incident) {
                    writeln!(output, "Refusing to delete the current or starting edge")?;
                    continue;
                }
                writeln!(output, "Deleting {}", sub.conn().describe_edge(doomed))?;
                sub.delete_edge(doomed);
                e1 = None;
            }
            'C' => {
                for _ in 0..300 {
                    writeln!(output)?;
                }
            }
            'H' => writeln!(output, "{HELP}")?,
            'E' => break,
            other => writeln!(output, "{other} is an invalid command")?,
        }
    }
    Ok(())
}
