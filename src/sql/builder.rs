//! Builds parameterized SELECT, INSERT, UPDATE, DELETE from an entity's field registry.

use crate::filter::{Operator, Predicate};
use crate::schema::{Entity, FieldType, FieldValue};

/// Quote identifier for PostgreSQL (safe: only from the static schema or validated config).
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Full qualified table name.
fn qualified_table(schema: &str, table: &str) -> String {
    format!("{}.{}", quoted(schema), quoted(table))
}

/// PostgreSQL type a text-bound parameter is cast to.
fn pg_type(ty: FieldType) -> &'static str {
    match ty {
        FieldType::Text => "text",
        FieldType::Integer => "bigint",
        FieldType::Decimal => "numeric",
        FieldType::Boolean => "boolean",
        FieldType::Uuid => "uuid",
        FieldType::Timestamp => "timestamptz",
    }
}

#[derive(Debug)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<FieldValue>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    /// Push a parameter and return its typed placeholder, e.g. `$2::uuid`.
    fn push_param(&mut self, v: FieldValue, ty: FieldType) -> String {
        self.params.push(v);
        format!("${}::{}", self.params.len(), pg_type(ty))
    }
}

fn column_list<E: Entity>() -> String {
    E::fields()
        .iter()
        .map(|f| quoted(f.name()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// SQL condition for one predicate. Equality uses IS [NOT] DISTINCT FROM so
/// null compares as a value; text ordering uses byte order.
fn predicate_clause<E: 'static>(q: &mut QueryBuf, p: &Predicate<E>) -> String {
    let col = quoted(p.field.name());
    let ph = q.push_param(p.operand.clone(), p.field.ty());
    let text = p.field.ty() == FieldType::Text;
    match p.operator {
        Operator::Equal => format!("{} IS NOT DISTINCT FROM {}", col, ph),
        Operator::NotEqual => format!("{} IS DISTINCT FROM {}", col, ph),
        Operator::GreaterThan
        | Operator::LessThan
        | Operator::GreaterOrEqual
        | Operator::LessOrEqual => {
            let op = match p.operator {
                Operator::GreaterThan => ">",
                Operator::LessThan => "<",
                Operator::GreaterOrEqual => ">=",
                _ => "<=",
            };
            if text {
                format!("{} COLLATE \"C\" {} {}", col, op, ph)
            } else {
                format!("{} {} {}", col, op, ph)
            }
        }
        Operator::Contains => format!("strpos({}, {}) > 0", col, ph),
        Operator::StartsWith => format!("starts_with({}, {})", col, ph),
        Operator::EndsWith => format!("right({}, char_length({})) = {}", col, ph, ph),
    }
}

/// SELECT all columns, narrowed by the given predicates (AND).
pub fn select_list<E: Entity>(schema: &str, predicates: &[Predicate<E>]) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_parts: Vec<String> = predicates.iter().map(|p| predicate_clause(&mut q, p)).collect();
    let where_clause = if where_parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", where_parts.join(" AND "))
    };
    q.sql = format!(
        "SELECT {} FROM {}{}",
        column_list::<E>(),
        qualified_table(schema, E::TABLE),
        where_clause
    );
    q
}

/// SELECT by identity.
pub fn select_by_id<E: Entity>(schema: &str, id: &FieldValue) -> QueryBuf {
    let mut q = QueryBuf::new();
    let key = E::identity_field();
    let ph = q.push_param(id.clone(), key.ty());
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = {}",
        column_list::<E>(),
        qualified_table(schema, E::TABLE),
        quoted(key.name()),
        ph
    );
    q
}

/// INSERT every declared column.
pub fn insert<E: Entity>(schema: &str, entity: &E) -> QueryBuf {
    let mut q = QueryBuf::new();
    let placeholders: Vec<String> = E::fields()
        .iter()
        .map(|f| q.push_param(f.get(entity), f.ty()))
        .collect();
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        qualified_table(schema, E::TABLE),
        column_list::<E>(),
        placeholders.join(", ")
    );
    q
}

/// UPDATE every non-identity column, matched by identity.
pub fn update<E: Entity>(schema: &str, entity: &E) -> QueryBuf {
    let mut q = QueryBuf::new();
    let key = E::identity_field();
    let sets: Vec<String> = E::fields()
        .iter()
        .filter(|f| !f.is_identity())
        .map(|f| format!("{} = {}", quoted(f.name()), q.push_param(f.get(entity), f.ty())))
        .collect();
    let ph = q.push_param(key.get(entity), key.ty());
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = {}",
        qualified_table(schema, E::TABLE),
        sets.join(", "),
        quoted(key.name()),
        ph
    );
    q
}

/// DELETE by identity.
pub fn delete<E: Entity>(schema: &str, entity: &E) -> QueryBuf {
    let mut q = QueryBuf::new();
    let key = E::identity_field();
    let ph = q.push_param(key.get(entity), key.ty());
    q.sql = format!(
        "DELETE FROM {} WHERE {} = {}",
        qualified_table(schema, E::TABLE),
        quoted(key.name()),
        ph
    );
    q
}
