//! Lowering a compiled [`Predicate`] to a SQL filter.
//!
//! Both the listing and the statistics queries pass the same predicate value
//! through [`lower`], so their filter semantics are identical by
//! construction.

use rusqlite::types::ToSqlOutput;
use rusqlite::ToSql;
use tender_query::{Comparison, DateOp, Leaf, NumberOp, Predicate};

pub(crate) const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// A bound parameter produced by lowering or by record binding.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SqlParam {
    Null,
    Text(String),
    Real(f64),
    Int(i64),
}

impl ToSql for SqlParam {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            SqlParam::Null => rusqlite::types::Null.to_sql(),
            SqlParam::Text(v) => v.to_sql(),
            SqlParam::Real(v) => v.to_sql(),
            SqlParam::Int(v) => v.to_sql(),
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct SqlFilter {
    pub clause: String,
    pub params: Vec<SqlParam>,
}

/// Render a predicate as a `WHERE`-clause fragment plus its parameters.
pub(crate) fn lower(predicate: &Predicate) -> SqlFilter {
    let mut filter = SqlFilter::default();
    lower_into(predicate, &mut filter);
    filter
}

fn lower_into(predicate: &Predicate, out: &mut SqlFilter) {
    match predicate {
        Predicate::True => out.clause.push_str("1=1"),
        Predicate::And(parts) => lower_joined(parts, " AND ", out),
        Predicate::Or(parts) => lower_joined(parts, " OR ", out),
        Predicate::Not(inner) => {
            out.clause.push_str("NOT (");
            lower_into(inner, out);
            out.clause.push(')');
        }
        Predicate::Leaf(leaf) => lower_leaf(leaf, out),
    }
}

fn lower_joined(parts: &[Predicate], joiner: &str, out: &mut SqlFilter) {
    out.clause.push('(');
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            out.clause.push_str(joiner);
        }
        lower_into(part, out);
    }
    out.clause.push(')');
}

fn lower_leaf(leaf: &Leaf, out: &mut SqlFilter) {
    let col = leaf.field.name;
    match &leaf.cmp {
        Comparison::TextContains {
            needle,
            case_sensitive,
        } => {
            if *case_sensitive {
                out.clause.push_str(&format!("instr({col}, ?) > 0"));
            } else {
                out.clause
                    .push_str(&format!("instr(lower({col}), lower(?)) > 0"));
            }
            out.params.push(SqlParam::Text(needle.clone()));
        }
        Comparison::TextEquals {
            needle,
            case_sensitive,
        } => {
            if *case_sensitive {
                out.clause.push_str(&format!("{col} = ?"));
            } else {
                out.clause.push_str(&format!("lower({col}) = lower(?)"));
            }
            out.params.push(SqlParam::Text(needle.clone()));
        }
        Comparison::TextNotEquals {
            needle,
            case_sensitive,
        } => {
            if *case_sensitive {
                out.clause.push_str(&format!("{col} <> ?"));
            } else {
                out.clause.push_str(&format!("lower({col}) <> lower(?)"));
            }
            out.params.push(SqlParam::Text(needle.clone()));
        }
        Comparison::Number { op, value } => {
            let op = match op {
                NumberOp::Equals => "=",
                NumberOp::NotEquals => "<>",
                NumberOp::GreaterThan => ">",
                NumberOp::LessThan => "<",
                NumberOp::GreaterThanOrEqual => ">=",
                NumberOp::LessThanOrEqual => "<=",
            };
            // Numeric-text columns are compared numerically; thousands
            // separators in the stored text are stripped first.
            out.clause
                .push_str(&format!("CAST(REPLACE({col}, ',', '') AS REAL) {op} ?"));
            out.params.push(SqlParam::Real(*value));
        }
        Comparison::Date { op, bound } => {
            let op = match op {
                DateOp::GreaterThan => ">",
                DateOp::LessThan => "<",
                DateOp::GreaterThanOrEqual => ">=",
                DateOp::LessThanOrEqual => "<=",
            };
            out.clause.push_str(&format!("{col} {op} ?"));
            out.params
                .push(SqlParam::Text(bound.format(DATETIME_FORMAT).to_string()));
        }
        Comparison::DateOnDay { start, end } => {
            out.clause.push_str(&format!("({col} >= ? AND {col} < ?)"));
            out.params
                .push(SqlParam::Text(start.format(DATETIME_FORMAT).to_string()));
            out.params
                .push(SqlParam::Text(end.format(DATETIME_FORMAT).to_string()));
        }
    }
}
