#![allow(clippy::missing_errors_doc)]

use std::{error::Error, fmt};

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use cellstage_core::{CellCoord, CellStatus, Command, ComponentKind};
use cellstage_grid::{query, Stage};
use serde::{Deserialize, Serialize};

const LAYOUT_DOMAIN: &str = "stage";
const LAYOUT_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded layout payload.
pub(crate) const LAYOUT_HEADER: &str = "stage:v1";
/// Delimiter used to separate the prefix, grid dimensions and payload.
const FIELD_DELIMITER: char = ':';

/// Snapshot of the cells authored on a stage plus the grid configuration.
///
/// Only cells that carry status flags or components are stored; everything
/// else is reconstructed empty on import.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct StageLayout {
    /// Number of grid columns contained in the layout.
    pub width: u32,
    /// Number of grid rows contained in the layout.
    pub height: u32,
    /// Authored cells captured by the layout.
    pub cells: Vec<CellLayout>,
}

impl StageLayout {
    /// Captures the authored layout of the provided stage.
    pub(crate) fn capture(stage: &Stage) -> Self {
        let view = query::stage_view(stage);
        let cells = view
            .cells
            .iter()
            .filter(|cell| !cell.status.is_empty() || !cell.components.is_empty())
            .map(|cell| CellLayout {
                column: cell.coord.column(),
                row: cell.coord.row(),
                status_bits: cell.status.bits(),
                components: cell
                    .components
                    .iter()
                    .map(|component| component.kind)
                    .collect(),
            })
            .collect();
        Self {
            width: view.size.width(),
            height: view.size.height(),
            cells,
        }
    }

    /// Commands that rebuild the layout on a freshly created stage.
    pub(crate) fn commands(&self) -> Vec<Command> {
        let mut commands = vec![Command::ResizeGrid {
            width: self.width,
            height: self.height,
        }];
        for cell in &self.cells {
            let coord = CellCoord::new(cell.column, cell.row);
            let status = CellStatus::from_bits_truncate(cell.status_bits);
            if !status.is_empty() {
                commands.push(Command::SetCellStatus {
                    cell: coord,
                    status,
                });
            }
            for kind in &cell.components {
                commands.push(Command::AddComponent {
                    cell: coord,
                    kind: *kind,
                });
            }
        }
        commands
    }

    /// Encodes the layout into a single-line string suitable for clipboard
    /// transfer.
    #[must_use]
    pub(crate) fn encode(&self) -> String {
        let payload = SerializableLayout {
            cells: self.cells.clone(),
        };
        let json = serde_json::to_vec(&payload).expect("stage layout serialization never fails");
        let encoded = STANDARD_NO_PAD.encode(json);
        format!("{LAYOUT_HEADER}:{}x{}:{encoded}", self.width, self.height)
    }

    /// Decodes a layout from the provided string representation.
    pub(crate) fn decode(value: &str) -> Result<Self, LayoutTransferError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(LayoutTransferError::EmptyPayload);
        }

        let mut parts = trimmed.split(FIELD_DELIMITER);
        let domain = parts.next().ok_or(LayoutTransferError::MissingPrefix)?;
        let version = parts.next().ok_or(LayoutTransferError::MissingVersion)?;
        let dimensions = parts.next().ok_or(LayoutTransferError::MissingDimensions)?;
        let payload = parts.next().ok_or(LayoutTransferError::MissingPayload)?;

        if domain != LAYOUT_DOMAIN {
            return Err(LayoutTransferError::InvalidPrefix(domain.to_owned()));
        }
        if version != LAYOUT_VERSION {
            return Err(LayoutTransferError::UnsupportedVersion(version.to_owned()));
        }

        let (width, height) = parse_dimensions(dimensions)?;
        let bytes = STANDARD_NO_PAD
            .decode(payload.as_bytes())
            .map_err(LayoutTransferError::InvalidEncoding)?;
        let decoded: SerializableLayout =
            serde_json::from_slice(&bytes).map_err(LayoutTransferError::InvalidPayload)?;

        Ok(Self {
            width,
            height,
            cells: decoded.cells,
        })
    }
}

/// Authored cell description captured within a layout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct CellLayout {
    /// Zero-based column of the cell.
    pub column: u32,
    /// Zero-based row of the cell.
    pub row: u32,
    /// Raw status flag bits carried by the cell.
    pub status_bits: u8,
    /// Kinds of the components attached to the cell, in insertion order.
    pub components: Vec<ComponentKind>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct SerializableLayout {
    cells: Vec<CellLayout>,
}

fn parse_dimensions(value: &str) -> Result<(u32, u32), LayoutTransferError> {
    let mut parts = value.split('x');
    let width = parts
        .next()
        .and_then(|part| part.parse().ok())
        .ok_or_else(|| LayoutTransferError::InvalidDimensions(value.to_owned()))?;
    let height = parts
        .next()
        .and_then(|part| part.parse().ok())
        .ok_or_else(|| LayoutTransferError::InvalidDimensions(value.to_owned()))?;
    if parts.next().is_some() {
        return Err(LayoutTransferError::InvalidDimensions(value.to_owned()));
    }
    Ok((width, height))
}

/// Errors that can occur while decoding layout transfer strings.
#[derive(Debug)]
pub(crate) enum LayoutTransferError {
    /// The provided string was empty or contained only whitespace.
    EmptyPayload,
    /// The prefix segment was missing from the encoded layout.
    MissingPrefix,
    /// The encoded layout did not contain a version segment.
    MissingVersion,
    /// The encoded layout did not include grid dimensions.
    MissingDimensions,
    /// The encoded layout did not include the payload segment.
    MissingPayload,
    /// The encoded layout used an unexpected prefix segment.
    InvalidPrefix(String),
    /// The encoded layout used an unsupported version identifier.
    UnsupportedVersion(String),
    /// The grid dimensions could not be parsed from the encoded layout.
    InvalidDimensions(String),
    /// The base64 payload could not be decoded.
    InvalidEncoding(base64::DecodeError),
    /// The decoded payload could not be deserialised.
    InvalidPayload(serde_json::Error),
}

impl fmt::Display for LayoutTransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPayload => write!(f, "layout string is empty"),
            Self::MissingPrefix => write!(f, "layout string is missing the prefix segment"),
            Self::MissingVersion => write!(f, "layout string is missing the version segment"),
            Self::MissingDimensions => {
                write!(f, "layout string is missing the grid dimensions")
            }
            Self::MissingPayload => write!(f, "layout string is missing the payload segment"),
            Self::InvalidPrefix(prefix) => {
                write!(f, "unexpected layout prefix {prefix:?}, expected {LAYOUT_DOMAIN:?}")
            }
            Self::UnsupportedVersion(version) => {
                write!(f, "unsupported layout version {version:?}")
            }
            Self::InvalidDimensions(dimensions) => {
                write!(f, "grid dimensions {dimensions:?} are not of the form WxH")
            }
            Self::InvalidEncoding(error) => write!(f, "payload is not valid base64: {error}"),
            Self::InvalidPayload(error) => write!(f, "payload is not a valid layout: {error}"),
        }
    }
}

impl Error for LayoutTransferError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidEncoding(error) => Some(error),
            Self::InvalidPayload(error) => Some(error),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{LayoutTransferError, StageLayout, LAYOUT_HEADER};
    use cellstage_core::{CellCoord, CellStatus, Command, ComponentKind, GridSize};
    use cellstage_grid::{apply, Stage};

    fn authored_stage() -> Stage {
        let mut stage = Stage::new(GridSize::new(3, 2).expect("positive size"));
        let mut events = Vec::new();
        apply(
            &mut stage,
            Command::SetCellStatus {
                cell: CellCoord::new(1, 0),
                status: CellStatus::MOVABLE,
            },
            &mut events,
        );
        apply(
            &mut stage,
            Command::AddComponent {
                cell: CellCoord::new(2, 1),
                kind: ComponentKind::EnemySpawner,
            },
            &mut events,
        );
        stage
    }

    #[test]
    fn encode_emits_header_and_dimensions() {
        let layout = StageLayout::capture(&authored_stage());
        let encoded = layout.encode();
        assert!(encoded.starts_with(&format!("{LAYOUT_HEADER}:3x2:")));
    }

    #[test]
    fn layout_round_trips_through_encoding() {
        let layout = StageLayout::capture(&authored_stage());
        let decoded = StageLayout::decode(&layout.encode()).expect("own encoding must decode");
        assert_eq!(decoded, layout);
    }

    #[test]
    fn replayed_commands_rebuild_the_authored_cells() {
        let layout = StageLayout::capture(&authored_stage());
        let mut restored = Stage::new(GridSize::new(1, 1).expect("positive size"));
        let mut events = Vec::new();
        for command in layout.commands() {
            apply(&mut restored, command, &mut events);
        }
        assert_eq!(StageLayout::capture(&restored), layout);
    }

    #[test]
    fn decode_rejects_foreign_prefixes() {
        let error = StageLayout::decode("board:v1:3x2:AAAA").expect_err("prefix must match");
        assert!(matches!(error, LayoutTransferError::InvalidPrefix(_)));
    }

    #[test]
    fn decode_rejects_mangled_dimensions() {
        let error =
            StageLayout::decode("stage:v1:3by2:AAAA").expect_err("dimensions must be WxH");
        assert!(matches!(error, LayoutTransferError::InvalidDimensions(_)));
    }

    #[test]
    fn decode_rejects_empty_input() {
        let error = StageLayout::decode("   ").expect_err("blank input must fail");
        assert!(matches!(error, LayoutTransferError::EmptyPayload));
    }
}
