//! Attendance marks and per-session status groups.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::grid::{Grid, SessionHeader};

/// Shown instead of an empty key-holder list.
pub const NEEDS_CONFIRMATION: &str = "※登録なし・要確認";

/// Attendance status stored in a member/session cell.
///
/// The cell codes are shared with the registration form and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mark {
    /// Attends and opens the venue.
    Key,
    Join,
    Absent,
    Late,
    Early,
}

impl Mark {
    pub const ALL: [Mark; 5] = [Mark::Key, Mark::Join, Mark::Absent, Mark::Late, Mark::Early];

    /// Cell value for this mark.
    pub fn code(&self) -> &'static str {
        match self {
            Mark::Key => "鍵",
            Mark::Join => "出",
            Mark::Absent => "欠",
            Mark::Late => "遅",
            Mark::Early => "早",
        }
    }

    /// Mark stored in a cell; `None` for blank or foreign values.
    pub fn from_code(cell: &str) -> Option<Mark> {
        Self::ALL.into_iter().find(|m| m.code() == cell)
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Mark {
    type Err = ValidationError;

    /// Accepts either the cell code or the English name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(mark) = Mark::from_code(s) {
            return Ok(mark);
        }
        match s.to_ascii_lowercase().as_str() {
            "key" => Ok(Mark::Key),
            "join" => Ok(Mark::Join),
            "absent" => Ok(Mark::Absent),
            "late" => Ok(Mark::Late),
            "early" => Ok(Mark::Early),
            _ => Err(ValidationError::InvalidValue {
                field: "mark".into(),
                message: format!("unknown mark '{s}'"),
            }),
        }
    }
}

/// Members of one session partitioned by mark. Absent and unmarked members
/// appear in no group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusGroups {
    pub key_holders: Vec<String>,
    pub joiners: Vec<String>,
    pub late_comers: Vec<String>,
    pub early_leavers: Vec<String>,
}

/// A session header together with who is coming.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionAttendance {
    #[serde(flatten)]
    pub header: SessionHeader,
    pub groups: StatusGroups,
}

impl SessionAttendance {
    /// Notification block for this session.
    pub fn render(&self) -> String {
        let SessionHeader {
            date,
            time,
            name,
            place,
        } = &self.header;
        let groups = &self.groups;

        let key_holders = if groups.key_holders.is_empty() {
            NEEDS_CONFIRMATION.to_string()
        } else {
            groups.key_holders.join(", ")
        };

        let mut lines = vec![
            format!("{date} {time}<br/>{name} @{place}<br/>"),
            format!("[鍵開け担当者]: {key_holders}<br/>"),
            format!("[参加者]: {}<br/>", groups.joiners.join(", ")),
        ];
        if !groups.late_comers.is_empty() {
            lines.push(format!("[遅刻]:{}<br/>", groups.late_comers.join(", ")));
        }
        if !groups.early_leavers.is_empty() {
            lines.push(format!("[早退]:{}<br/>", groups.early_leavers.join(", ")));
        }
        lines.join("\n")
    }
}

/// Names of the members whose cell in `column` holds `mark`.
pub fn members_with(grid: &Grid, column: usize, mark: Mark) -> Vec<String> {
    grid.member_rows()
        .filter(|&row| grid.cell(row, column) == mark.code())
        .map(|row| grid.member_name(row).to_string())
        .collect()
}

/// Group the members of the session in grid column `column`.
///
/// Returns `None` when the column does not exist.
pub fn aggregate(grid: &Grid, column: usize) -> Option<SessionAttendance> {
    let header = grid.header(column)?;
    Some(SessionAttendance {
        header,
        groups: StatusGroups {
            key_holders: members_with(grid, column, Mark::Key),
            joiners: members_with(grid, column, Mark::Join),
            late_comers: members_with(grid, column, Mark::Late),
            early_leavers: members_with(grid, column, Mark::Early),
        },
    })
}
