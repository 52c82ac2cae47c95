//! Compiled filters over a single entity type.

use crate::error::FilterError;
use crate::filter::{Criterion, Operator};
use crate::schema::{introspect, Field, FieldValue, Filterable};
use std::fmt;

/// A criterion bound to a resolved field with its operand parsed into the
/// field's type.
pub struct Predicate<E: 'static> {
    pub field: &'static Field<E>,
    pub operator: Operator,
    pub operand: FieldValue,
}

impl<E: Filterable> Predicate<E> {
    /// Resolve the field, check operator compatibility, and parse the operand.
    pub fn compile(criterion: &Criterion) -> Result<Self, FilterError> {
        let field = introspect::resolve::<E>(&criterion.property)?;
        let operator = criterion.operator;
        if !operator.supports(field.ty()) {
            return Err(FilterError::UnsupportedOperator {
                field: field.name().to_string(),
                operator,
                ty: field.ty(),
            });
        }
        let operand = match &criterion.value {
            None if operator.is_equality() => FieldValue::Null,
            None => {
                return Err(FilterError::NullOperand {
                    field: field.name().to_string(),
                    operator,
                })
            }
            Some(raw) => field.ty().parse(raw).map_err(|_| FilterError::TypeMismatch {
                field: field.name().to_string(),
                expected: field.ty(),
                value: raw.clone(),
            })?,
        };
        Ok(Predicate {
            field,
            operator,
            operand,
        })
    }
}

impl<E: 'static> Predicate<E> {
    pub fn test(&self, entity: &E) -> Result<bool, FilterError> {
        let value = self.field.get(entity);
        self.operator.evaluate(self.field.name(), &value, &self.operand)
    }

    /// True when evaluation can never raise, so a store may translate the
    /// predicate into its own query language without changing the outcome.
    pub fn is_pushable(&self) -> bool {
        self.operator.is_equality() || !self.field.nullable()
    }
}

impl<E: 'static> Clone for Predicate<E> {
    fn clone(&self) -> Self {
        Predicate {
            field: self.field,
            operator: self.operator,
            operand: self.operand.clone(),
        }
    }
}

impl<E: 'static> fmt::Debug for Predicate<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.field.name(), self.operator, self.operand)
    }
}

/// Conjunction of predicates over `E`. Empty matches everything.
pub struct Filter<E: 'static> {
    predicates: Vec<Predicate<E>>,
}

impl<E: Filterable> Filter<E> {
    /// Compile every criterion up front, so an unknown field or a bad operand
    /// fails the whole operation even when there is nothing to filter.
    pub fn compile(criteria: &[Criterion]) -> Result<Self, FilterError> {
        let predicates = criteria
            .iter()
            .map(Predicate::<E>::compile)
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(entity = E::ENTITY, predicates = ?predicates, "compiled filter");
        Ok(Filter { predicates })
    }
}

impl<E: 'static> Filter<E> {
    /// Pass-through filter.
    pub fn all() -> Self {
        Filter {
            predicates: Vec::new(),
        }
    }

    pub fn from_predicates(predicates: Vec<Predicate<E>>) -> Self {
        Filter { predicates }
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn predicates(&self) -> &[Predicate<E>] {
        &self.predicates
    }

    /// Short-circuits on the first predicate that does not hold.
    pub fn matches(&self, entity: &E) -> Result<bool, FilterError> {
        for p in &self.predicates {
            if !p.test(entity)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Lazily filter `entities`, preserving their relative order.
    pub fn filter<I>(&self, entities: I) -> Filtered<'_, E, I::IntoIter>
    where
        I: IntoIterator<Item = E>,
    {
        Filtered {
            filter: self,
            inner: entities.into_iter(),
        }
    }

    pub fn apply<I>(&self, entities: I) -> Result<Vec<E>, FilterError>
    where
        I: IntoIterator<Item = E>,
    {
        self.filter(entities).collect()
    }

    /// Split into (predicates a store may push down, residual filter to run in
    /// memory). Running both yields the same result as running `self`.
    pub fn partition(&self) -> (Vec<Predicate<E>>, Filter<E>) {
        let (pushed, residual): (Vec<_>, Vec<_>) =
            self.predicates.iter().cloned().partition(Predicate::is_pushable);
        (pushed, Filter::from_predicates(residual))
    }
}

impl<E: 'static> Clone for Filter<E> {
    fn clone(&self) -> Self {
        Filter {
            predicates: self.predicates.clone(),
        }
    }
}

impl<E: 'static> fmt::Debug for Filter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.predicates).finish()
    }
}

/// Iterator returned by [`Filter::filter`]. Yields the first evaluation error
/// and then whatever follows; callers collecting into `Result` stop there.
pub struct Filtered<'a, E: 'static, I> {
    filter: &'a Filter<E>,
    inner: I,
}

impl<E: 'static, I> Iterator for Filtered<'_, E, I>
where
    I: Iterator<Item = E>,
{
    type Item = Result<E, FilterError>;

    fn next(&mut self) -> Option<Self::Item> {
        for entity in self.inner.by_ref() {
            match self.filter.matches(&entity) {
                Ok(true) => return Some(Ok(entity)),
                Ok(false) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
        None
    }
}

/// Filter `entities` by `criteria` in one call.
pub fn apply<E, I>(entities: I, criteria: &[Criterion]) -> Result<Vec<E>, FilterError>
where
    E: Filterable,
    I: IntoIterator<Item = E>,
{
    Filter::<E>::compile(criteria)?.apply(entities)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::parse_criteria;
    use crate::schema::{Customer, FieldType, Product};
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn product(name: Option<&str>, code: Option<&str>, price: i64) -> Product {
        Product {
            product_id: Uuid::new_v4(),
            name: name.map(String::from),
            code: code.map(String::from),
            price: Decimal::from(price),
        }
    }

    fn catalog() -> Vec<Product> {
        vec![
            product(Some("Widget"), Some("W-1"), 10),
            product(Some("Gadget"), None, 25),
            product(Some("Widget Pro"), Some("W-2"), 40),
            product(None, Some("X-9"), 5),
        ]
    }

    #[test]
    fn empty_criteria_is_identity() {
        let all = catalog();
        assert_eq!(apply(all.clone(), &[]).unwrap(), all);
        assert!(Filter::<Product>::compile(&[]).unwrap().is_empty());
    }

    #[test]
    fn contains_scenario() {
        let criteria = parse_criteria(Some(r#"[{"Property":"Name","Operator":"Contains","Value":"Wid"}]"#)).unwrap();
        let items = vec![product(Some("Widget"), None, 1), product(Some("Gadget"), None, 1)];
        let out = apply(items, &criteria).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name.as_deref(), Some("Widget"));
    }

    #[test]
    fn equal_parses_operand_into_field_type() {
        let all = catalog();
        let out = apply(all.clone(), &[Criterion::new("Price", Operator::Equal, "25.00")]).unwrap();
        assert_eq!(out, vec![all[1].clone()]);
        let id = all[2].product_id.to_string().to_uppercase();
        let out = apply(all.clone(), &[Criterion::new("ProductId", Operator::Equal, id)]).unwrap();
        assert_eq!(out, vec![all[2].clone()]);
    }

    #[test]
    fn equal_null_matches_null_fields() {
        let all = catalog();
        let out = apply(all.clone(), &[Criterion::null("Code", Operator::Equal)]).unwrap();
        assert_eq!(out, vec![all[1].clone()]);
        let out = apply(all.clone(), &[Criterion::null("Code", Operator::NotEqual)]).unwrap();
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn conjunction_equals_sequential_application() {
        let all = catalog();
        let c1 = Criterion::null("Code", Operator::NotEqual);
        let c2 = Criterion::new("Price", Operator::GreaterThan, "20");
        let both = apply(all.clone(), &[c1.clone(), c2.clone()]).unwrap();
        let staged = apply(apply(all.clone(), &[c1.clone()]).unwrap(), &[c2.clone()]).unwrap();
        assert_eq!(both, staged);
        assert_eq!(both, vec![all[2].clone()]);
        // order of criteria does not change the result set
        assert_eq!(apply(all, &[c2, c1]).unwrap(), both);
    }

    #[test]
    fn order_is_preserved() {
        let all = catalog();
        let out = apply(all.clone(), &[Criterion::new("Price", Operator::GreaterOrEqual, "10")]).unwrap();
        assert_eq!(out, vec![all[0].clone(), all[1].clone(), all[2].clone()]);
    }

    #[test]
    fn unknown_field_fails_even_without_entities() {
        let err = apply(Vec::<Product>::new(), &[Criterion::new("Colour", Operator::Equal, "red")]).unwrap_err();
        assert_eq!(
            err,
            FilterError::UnknownField {
                entity: "Product",
                field: "Colour".into()
            }
        );
    }

    #[test]
    fn unknown_field_is_never_ignored_among_valid_criteria() {
        let criteria = [
            Criterion::new("Name", Operator::Contains, "Wid"),
            Criterion::new("name", Operator::Contains, "Wid"),
        ];
        assert!(matches!(
            apply(catalog(), &criteria),
            Err(FilterError::UnknownField { .. })
        ));
    }

    #[test]
    fn unparsable_operand_is_a_type_mismatch() {
        let err = apply(catalog(), &[Criterion::new("Price", Operator::LessThan, "cheap")]).unwrap_err();
        assert_eq!(
            err,
            FilterError::TypeMismatch {
                field: "Price".into(),
                expected: FieldType::Decimal,
                value: "cheap".into()
            }
        );
    }

    #[test]
    fn incompatible_operator_is_rejected() {
        let err = apply(catalog(), &[Criterion::new("Price", Operator::Contains, "1")]).unwrap_err();
        assert!(matches!(err, FilterError::UnsupportedOperator { ty: FieldType::Decimal, .. }));
        let customers = vec![Customer::default()];
        let err = apply(customers, &[Criterion::new("IsActive", Operator::GreaterThan, "false")]).unwrap_err();
        assert!(matches!(err, FilterError::UnsupportedOperator { ty: FieldType::Boolean, .. }));
    }

    #[test]
    fn null_field_under_text_operator_fails_at_evaluation() {
        let filter = Filter::<Product>::compile(&[Criterion::new("Name", Operator::StartsWith, "W")]).unwrap();
        let all = catalog();
        assert!(filter.matches(&all[0]).unwrap());
        assert_eq!(
            filter.apply(all).unwrap_err(),
            FilterError::NullOperand {
                field: "Name".into(),
                operator: Operator::StartsWith
            }
        );
    }

    #[test]
    fn null_operand_is_rejected_for_ordering() {
        let err = Filter::<Product>::compile(&[Criterion::null("Price", Operator::GreaterThan)]).unwrap_err();
        assert!(matches!(err, FilterError::NullOperand { .. }));
    }

    #[test]
    fn filtering_is_lazy() {
        let filter = Filter::<Product>::compile(&[Criterion::new("Price", Operator::LessThan, "30")]).unwrap();
        let mut seen = 0;
        let mut it = filter.filter(catalog().into_iter().inspect(|_| seen += 1));
        assert!(it.next().unwrap().is_ok());
        drop(it);
        assert_eq!(seen, 1);
    }

    #[test]
    fn compiled_filters_can_cross_threads() {
        fn assert_shareable<T: Send + Sync + 'static>() {}
        assert_shareable::<Predicate<Product>>();
        assert_shareable::<Filter<Product>>();

        let filter = Filter::<Product>::compile(&[Criterion::new("Price", Operator::GreaterThan, "20")]).unwrap();
        let rows = std::thread::spawn(move || filter.apply(catalog()).unwrap())
            .join()
            .unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn partition_keeps_fallible_predicates_in_memory() {
        let filter = Filter::<Product>::compile(&[
            Criterion::null("Code", Operator::Equal),
            Criterion::new("Price", Operator::GreaterThan, "1"),
            Criterion::new("Name", Operator::Contains, "W"),
        ])
        .unwrap();
        let (pushed, residual) = filter.partition();
        let pushed: Vec<_> = pushed.iter().map(|p| p.field.name()).collect();
        assert_eq!(pushed, vec!["Code", "Price"]);
        assert_eq!(residual.predicates().len(), 1);
        assert_eq!(residual.predicates()[0].field.name(), "Name");
    }
}
