//! Table formatting utilities

use bonekit::Skeleton;
use prettytable::{Cell, Row, Table};

use super::format::{format_parent, format_rotation, format_vec3};

/// Create a table with bold headers
pub fn create_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.set_format(*prettytable::format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
    table.set_titles(Row::new(
        headers
            .iter()
            .map(|h| Cell::new(h).style_spec("b"))
            .collect(),
    ));
    table
}

/// One row per joint: index, parent, current position, bind position and
/// world rotation
pub fn pose_table(skeleton: &Skeleton) -> Table {
    let mut table = create_table(&["Joint", "Parent", "Position", "Bind position", "Rotation"]);
    for joint in skeleton.joints() {
        table.add_row(Row::new(vec![
            Cell::new(&joint.index().to_string()),
            Cell::new(&format_parent(joint.parent())),
            Cell::new(&format_vec3(joint.position())),
            Cell::new(&format_vec3(joint.bind_position())),
            Cell::new(&format_rotation(joint.orientation())),
        ]));
    }
    table
}
