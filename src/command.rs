//! Command-mode driver: one line, one command against a [`Document`].

use sheetlab_core::{CellId, Document, Value};
use sheetlab_engine::engine::{ERROR_SENTINEL, literal_value};
use std::io::Write;
use tracing::debug;

use crate::error::{CommandError, Result};

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Select(CellId),
    Click(CellId),
    Move { dcol: i32, drow: i32 },
    Edit,
    Type(String),
    Commit,
    Set { cell: CellId, formula: String },
    Cancel,
    Get(CellId),
    Value(CellId),
    Deps(CellId),
    Precedents(CellId),
    Mode,
    Selected,
    Cells,
    Log,
    Recalc,
    Expect(Vec<(CellId, Value)>),
}

impl Command {
    /// Parse one line. Blank lines and `#` comments yield None.
    pub fn parse(line: &str, doc: &Document) -> Result<Option<Command>> {
        let line = line.trim_start();
        if line.trim().is_empty() || line.starts_with('#') {
            return Ok(None);
        }
        let (name, rest) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest),
            None => (line, ""),
        };
        let name = name.to_ascii_lowercase();
        let rest = rest.trim_end_matches(['\r', '\n']);

        let cell_arg = |command: &'static str| -> Result<CellId> {
            let arg = rest.trim();
            if arg.is_empty() {
                return Err(CommandError::MissingArgument {
                    command,
                    argument: "a cell",
                });
            }
            Ok(doc.parse_cell(arg)?)
        };

        let command = match name.as_str() {
            "select" => Command::Select(cell_arg("select")?),
            "click" => Command::Click(cell_arg("click")?),
            "move" => {
                let mut parts = rest.split_whitespace();
                let (Some(dcol), Some(drow)) = (parts.next(), parts.next()) else {
                    return Err(CommandError::MissingArgument {
                        command: "move",
                        argument: "<dcol> <drow>",
                    });
                };
                Command::Move {
                    dcol: parse_offset(dcol)?,
                    drow: parse_offset(drow)?,
                }
            }
            "edit" => Command::Edit,
            "type" => Command::Type(rest.to_string()),
            "commit" => Command::Commit,
            "set" => {
                let rest = rest.trim_start();
                let (cell, formula) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                if cell.is_empty() {
                    return Err(CommandError::MissingArgument {
                        command: "set",
                        argument: "a cell",
                    });
                }
                Command::Set {
                    cell: doc.parse_cell(cell)?,
                    formula: formula.to_string(),
                }
            }
            "cancel" => Command::Cancel,
            "get" => Command::Get(cell_arg("get")?),
            "value" => Command::Value(cell_arg("value")?),
            "deps" => Command::Deps(cell_arg("deps")?),
            "precedents" => Command::Precedents(cell_arg("precedents")?),
            "mode" => Command::Mode,
            "selected" => Command::Selected,
            "cells" => Command::Cells,
            "log" => Command::Log,
            "recalc" => Command::Recalc,
            "expect" => {
                let expectations = rest
                    .split_whitespace()
                    .map(|pair| parse_expectation(pair, doc))
                    .collect::<Result<Vec<_>>>()?;
                if expectations.is_empty() {
                    return Err(CommandError::MissingArgument {
                        command: "expect",
                        argument: "<cell>=<value>",
                    });
                }
                Command::Expect(expectations)
            }
            _ => return Err(CommandError::UnknownCommand(name)),
        };
        Ok(Some(command))
    }
}

fn parse_offset(text: &str) -> Result<i32> {
    text.parse::<i32>()
        .map_err(|_| CommandError::InvalidNumber(text.to_string()))
}

fn parse_expectation(pair: &str, doc: &Document) -> Result<(CellId, Value)> {
    let (cell, value) = pair
        .split_once('=')
        .ok_or_else(|| CommandError::InvalidExpectation(pair.to_string()))?;
    let value = if value == ERROR_SENTINEL {
        Value::Error
    } else {
        literal_value(value)
    };
    Ok((doc.parse_cell(cell)?, value))
}

fn join_cells(cells: &[CellId]) -> String {
    cells.iter().map(ToString::to_string).collect::<Vec<_>>().join(" ")
}

/// Run one command, writing any output to `out`.
pub fn execute(doc: &mut Document, command: Command, out: &mut impl Write) -> Result<()> {
    debug!(?command, "executing command");
    match command {
        Command::Select(cell) => doc.select_cell(cell)?,
        Command::Click(cell) => doc.record_click(cell)?,
        Command::Move { dcol, drow } => {
            let cell = doc.move_selection(dcol, drow)?;
            writeln!(out, "{}", cell)?;
        }
        Command::Edit => doc.enter_edit_mode(),
        Command::Type(text) => doc.set_edit_buffer(&text),
        Command::Commit => {
            let report = doc.commit_buffer().ok_or(CommandError::NotEditing)??;
            writeln!(out, "{}", doc.display(&report.cell))?;
        }
        Command::Set { cell, formula } => {
            let report = doc.commit_edit(cell, &formula)?;
            writeln!(out, "{}", doc.display(&report.cell))?;
        }
        Command::Cancel => doc.cancel_edit(),
        Command::Get(cell) => writeln!(out, "{}", doc.display(&cell))?,
        Command::Value(cell) => {
            let value = doc.cell(&cell).map(|c| c.value.clone()).unwrap_or_default();
            writeln!(out, "{}", serde_json::to_string(&value)?)?;
        }
        Command::Deps(cell) => writeln!(out, "{}", join_cells(&doc.dependents(&cell)))?,
        Command::Precedents(cell) => writeln!(out, "{}", join_cells(&doc.precedents(&cell)))?,
        Command::Mode => writeln!(out, "{:?}", doc.mode())?,
        Command::Selected => writeln!(out, "{}", doc.selected())?,
        Command::Cells => {
            let cells: Vec<_> = doc.cells().values().collect();
            writeln!(out, "{}", serde_json::to_string(&cells)?)?;
        }
        Command::Log => writeln!(out, "{}", serde_json::to_string(doc.log())?)?,
        Command::Recalc => {
            let cycles = doc.recalculate_all();
            if !cycles.is_empty() {
                writeln!(out, "{}", join_cells(&cycles))?;
            }
        }
        Command::Expect(expected) => {
            let mismatches = doc.check_expected(&expected);
            if !mismatches.is_empty() {
                let details: Vec<String> = mismatches
                    .iter()
                    .map(|m| format!("{} expected {:?}, got {:?}", m.cell, m.expected, m.actual))
                    .collect();
                return Err(CommandError::ExpectationFailed(details.join("; ")));
            }
        }
    }
    Ok(())
}

/// Run `lines` in order, stopping at the first failure. Errors carry the
/// 1-based line number.
pub fn run_script<'a>(
    doc: &mut Document,
    lines: impl IntoIterator<Item = &'a str>,
    out: &mut impl Write,
) -> Result<()> {
    for (index, line) in lines.into_iter().enumerate() {
        let at_line = |source: CommandError| CommandError::Line {
            line: index + 1,
            source: Box::new(source),
        };
        if let Some(command) = Command::parse(line, doc).map_err(at_line)? {
            execute(doc, command, out).map_err(at_line)?;
        }
    }
    out.flush()?;
    Ok(())
}
