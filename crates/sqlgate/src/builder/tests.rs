use super::*;
use crate::filter::{Filter, Op};
use crate::ident::Ident;
use crate::value::Value;

fn ident(s: &str) -> Ident {
    Ident::parse(s).unwrap()
}

// ==================== SelectBuilder Tests ====================

#[test]
fn test_simple_select() {
    let qb = SelectBuilder::new(ident("users"));
    assert_eq!(qb.to_sql().unwrap(), "SELECT * FROM [users]");
}

#[test]
fn test_select_columns() {
    let mut qb = SelectBuilder::new(ident("users"));
    qb.columns([ident("id"), ident("username"), ident("email")]);
    assert_eq!(
        qb.to_sql().unwrap(),
        "SELECT [id], [username], [email] FROM [users]"
    );
}

#[test]
fn test_select_where_conditions() {
    let mut qb = SelectBuilder::new(ident("users"));
    qb.filter(Filter::new("status", Op::eq("active")).unwrap())
        .filter(Filter::new("role_id", Op::eq(1)).unwrap());
    let stmt = qb.build().unwrap();
    assert_eq!(
        stmt.sql,
        "SELECT * FROM [users] WHERE [status] = @w1 AND [role_id] = @w2"
    );
    assert_eq!(stmt.params.len(), 2);
    assert_eq!(stmt.params.get("w1"), Some(&Value::Text("active".into())));
    assert_eq!(stmt.params.get("w2"), Some(&Value::Int(1)));
}

#[test]
fn test_select_join() {
    let mut qb = SelectBuilder::new(ident("users"));
    qb.join(Join::new(JoinKind::Left, "roles", "[users].[role_id] = [roles].[id]").unwrap());
    assert_eq!(
        qb.to_sql().unwrap(),
        "SELECT * FROM [users] LEFT JOIN [roles] ON [users].[role_id] = [roles].[id]"
    );
}

#[test]
fn test_select_joins_in_order() {
    let mut qb = SelectBuilder::new(ident("orders"));
    qb.join(Join::new(JoinKind::Inner, "users", "[orders].[user_id] = [users].[id]").unwrap())
        .join(Join::new(JoinKind::Full, "invoices", "[orders].[id] = [invoices].[order_id]").unwrap());
    let sql = qb.to_sql().unwrap();
    let inner = sql.find("INNER JOIN [users]").unwrap();
    let full = sql.find("FULL OUTER JOIN [invoices]").unwrap();
    assert!(inner < full);
}

#[test]
fn test_select_order_by_preserved() {
    let mut qb = SelectBuilder::new(ident("users"));
    qb.order_by(OrderTerm::desc("created_at").unwrap())
        .order_by(OrderTerm::asc("id").unwrap());
    assert_eq!(
        qb.to_sql().unwrap(),
        "SELECT * FROM [users] ORDER BY [created_at] DESC, [id] ASC"
    );
}

#[test]
fn test_select_limit_only_uses_top() {
    let mut qb = SelectBuilder::new(ident("users"));
    qb.order_by(OrderTerm::asc("id").unwrap()).limit(10);
    assert_eq!(
        qb.to_sql().unwrap(),
        "SELECT TOP (10) * FROM [users] ORDER BY [id] ASC"
    );
}

#[test]
fn test_select_limit_and_offset_uses_fetch() {
    let mut qb = SelectBuilder::new(ident("users"));
    qb.order_by(OrderTerm::asc("id").unwrap()).limit(10).offset(20);
    assert_eq!(
        qb.to_sql().unwrap(),
        "SELECT * FROM [users] ORDER BY [id] ASC OFFSET 20 ROWS FETCH NEXT 10 ROWS ONLY"
    );
}

#[test]
fn test_select_offset_without_limit() {
    let mut qb = SelectBuilder::new(ident("users"));
    qb.order_by(OrderTerm::asc("id").unwrap()).offset(5);
    assert_eq!(
        qb.to_sql().unwrap(),
        "SELECT * FROM [users] ORDER BY [id] ASC OFFSET 5 ROWS"
    );
}

#[test]
fn test_select_offset_without_order_rejected() {
    let mut qb = SelectBuilder::new(ident("users"));
    qb.limit(10).offset(20);
    let err = qb.build().unwrap_err();
    assert!(err.is_validation());
    assert!(err.to_string().contains("ordering"));
}

#[test]
fn test_select_top_not_confused_by_from_like_names() {
    // A column whose name contains "from" must not disturb the TOP path.
    let mut qb = SelectBuilder::new(ident("audit"));
    qb.column(ident("from_state")).column(ident("to_state")).limit(3);
    assert_eq!(
        qb.to_sql().unwrap(),
        "SELECT TOP (3) [from_state], [to_state] FROM [audit]"
    );
}

#[test]
fn test_select_value_never_in_text() {
    let hostile = "x'; DROP TABLE users;--";
    let mut qb = SelectBuilder::new(ident("users"));
    qb.filter(Filter::new("name", Op::eq(hostile)).unwrap());
    let stmt = qb.build().unwrap();
    assert!(!stmt.sql.contains(hostile));
    assert_eq!(stmt.params.get("w1"), Some(&Value::Text(hostile.into())));
}

#[test]
fn test_select_full_shape() {
    let mut qb = SelectBuilder::new(ident("dbo.Orders"));
    qb.columns([ident("id"), ident("total")])
        .join(Join::new(JoinKind::Inner, "dbo.Users", "[Orders].[user_id] = [Users].[id]").unwrap())
        .filter(Filter::new("status", Op::in_list(vec!["open".into(), "held".into()])).unwrap())
        .filter(Filter::new("total", Op::gt(100)).unwrap())
        .order_by(OrderTerm::desc("total").unwrap())
        .limit(25)
        .offset(50);
    let stmt = qb.build().unwrap();
    assert_eq!(
        stmt.sql,
        "SELECT [id], [total] FROM [dbo].[Orders] \
         INNER JOIN [dbo].[Users] ON [Orders].[user_id] = [Users].[id] \
         WHERE [status] IN (@w1, @w2) AND [total] > @w3 \
         ORDER BY [total] DESC OFFSET 50 ROWS FETCH NEXT 25 ROWS ONLY"
    );
    assert_eq!(stmt.params.len(), 3);
}

// ==================== InsertBuilder Tests ====================

#[test]
fn test_insert_basic() {
    let mut ib = InsertBuilder::new(ident("users"));
    ib.set(ident("username"), "test").set(ident("age"), 25);
    let stmt = ib.build().unwrap();
    assert_eq!(
        stmt.sql,
        "INSERT INTO [users] ([username], [age]) VALUES (@v1, @v2)"
    );
    assert_eq!(stmt.params.get("v1"), Some(&Value::Text("test".into())));
    assert_eq!(stmt.params.get("v2"), Some(&Value::Int(25)));
}

#[test]
fn test_insert_empty_rejected() {
    let ib = InsertBuilder::new(ident("users"));
    assert!(ib.build().is_err());
}

#[test]
fn test_insert_column_order_preserved() {
    let mut ib = InsertBuilder::new(ident("users"));
    ib.set(ident("zeta"), 1).set(ident("alpha"), 2);
    assert_eq!(
        ib.to_sql().unwrap(),
        "INSERT INTO [users] ([zeta], [alpha]) VALUES (@v1, @v2)"
    );
}

// ==================== UpdateBuilder Tests ====================

#[test]
fn test_update_basic() {
    let mut ub = UpdateBuilder::new(ident("Users"));
    ub.set(ident("name"), "Ann")
        .set(ident("active"), true)
        .filter(Filter::new("id", Op::eq(42)).unwrap());
    let stmt = ub.build().unwrap();
    assert_eq!(
        stmt.sql,
        "UPDATE [Users] SET [name] = @s1, [active] = @s2 WHERE [id] = @w1"
    );
    assert_eq!(stmt.params.get("s1"), Some(&Value::Text("Ann".into())));
    assert_eq!(stmt.params.get("s2"), Some(&Value::Bool(true)));
    assert_eq!(stmt.params.get("w1"), Some(&Value::Int(42)));
}

#[test]
fn test_update_set_and_where_pools_disjoint() {
    // The same column in SET and WHERE must produce distinct names.
    let mut ub = UpdateBuilder::new(ident("users"));
    ub.set(ident("status"), "inactive")
        .filter(Filter::new("status", Op::eq("active")).unwrap());
    let stmt = ub.build().unwrap();
    assert_eq!(
        stmt.sql,
        "UPDATE [users] SET [status] = @s1 WHERE [status] = @w1"
    );
    assert_eq!(stmt.params.get("s1"), Some(&Value::Text("inactive".into())));
    assert_eq!(stmt.params.get("w1"), Some(&Value::Text("active".into())));
}

#[test]
fn test_update_requires_set() {
    let mut ub = UpdateBuilder::new(ident("users"));
    ub.filter(Filter::new("id", Op::eq(1)).unwrap());
    let err = ub.build().unwrap_err();
    assert!(err.to_string().contains("SET"));
}

#[test]
fn test_update_requires_where() {
    let mut ub = UpdateBuilder::new(ident("users"));
    ub.set(ident("status"), "x");
    let err = ub.build().unwrap_err();
    assert!(err.to_string().contains("filter"));
}

// ==================== DeleteBuilder Tests ====================

#[test]
fn test_delete_basic() {
    let mut db = DeleteBuilder::new(ident("users"));
    db.filter(Filter::new("id", Op::eq(1)).unwrap());
    assert_eq!(db.to_sql().unwrap(), "DELETE FROM [users] WHERE [id] = @w1");
}

#[test]
fn test_delete_with_in() {
    let mut db = DeleteBuilder::new(ident("users"));
    db.filter(Filter::new("id", Op::in_list(vec![1.into(), 2.into(), 3.into()])).unwrap());
    let stmt = db.build().unwrap();
    assert_eq!(stmt.sql, "DELETE FROM [users] WHERE [id] IN (@w1, @w2, @w3)");
    assert_eq!(stmt.params.len(), 3);
}

#[test]
fn test_delete_requires_where() {
    let db = DeleteBuilder::new(ident("users"));
    assert!(db.build().is_err());
}

#[test]
fn test_delete_all_requires_opt_in() {
    let mut db = DeleteBuilder::new(ident("users"));
    db.allow_delete_all(true);
    assert_eq!(db.to_sql().unwrap(), "DELETE FROM [users]");
}

// ==================== Batch Tests ====================

#[test]
fn test_batch_insert_scopes_names_by_position() {
    let mut batch = BatchInsert::new(ident("users"));
    for name in ["Ann", "Bo", "Cy"] {
        let mut record = Record::new();
        record.set(ident("name"), name);
        batch.push(record);
    }
    let stmt = batch.build().unwrap();
    assert_eq!(
        stmt.sql,
        "INSERT INTO [users] ([name]) VALUES (@b0_v1);\n\
         INSERT INTO [users] ([name]) VALUES (@b1_v1);\n\
         INSERT INTO [users] ([name]) VALUES (@b2_v1)"
    );
    // Same column across three entries -> three distinct names.
    assert_eq!(stmt.params.len(), 3);
    assert_eq!(stmt.params.get("b1_v1"), Some(&Value::Text("Bo".into())));
}

#[test]
fn test_batch_insert_empty_rejected() {
    let batch = BatchInsert::new(ident("users"));
    assert!(batch.build().is_err());
}

#[test]
fn test_batch_update_entries() {
    let mut batch = BatchUpdate::new(ident("users"));
    let mut r1 = Record::new();
    r1.set(ident("status"), "active");
    let mut r2 = Record::new();
    r2.set(ident("status"), "banned");
    batch.push(r1, vec![Filter::new("id", Op::eq(1)).unwrap()]);
    batch.push(r2, vec![Filter::new("id", Op::eq(2)).unwrap()]);

    let stmt = batch.build().unwrap();
    assert_eq!(
        stmt.sql,
        "UPDATE [users] SET [status] = @b0_s1 WHERE [id] = @b0_w1;\n\
         UPDATE [users] SET [status] = @b1_s1 WHERE [id] = @b1_w1"
    );
    assert_eq!(stmt.params.len(), 4);
    assert_eq!(stmt.params.get("b0_w1"), Some(&Value::Int(1)));
    assert_eq!(stmt.params.get("b1_w1"), Some(&Value::Int(2)));
}

#[test]
fn test_batch_update_entry_missing_where_rejected() {
    let mut batch = BatchUpdate::new(ident("users"));
    let mut record = Record::new();
    record.set(ident("status"), "x");
    batch.push(record, vec![]);
    assert!(batch.build().is_err());
}

#[test]
fn test_batch_delete_entries() {
    let mut batch = BatchDelete::new(ident("events"));
    batch.push(vec![Filter::new("id", Op::eq(10)).unwrap()]);
    batch.push(vec![
        Filter::new("kind", Op::eq("audit")).unwrap(),
        Filter::new("age_days", Op::gt(30)).unwrap(),
    ]);
    let stmt = batch.build().unwrap();
    assert_eq!(
        stmt.sql,
        "DELETE FROM [events] WHERE [id] = @b0_w1;\n\
         DELETE FROM [events] WHERE [kind] = @b1_w1 AND [age_days] > @b1_w2"
    );
    assert_eq!(stmt.params.len(), 3);
}

#[test]
fn test_batch_delete_never_allows_delete_all() {
    let mut batch = BatchDelete::new(ident("events"));
    batch.push(vec![]);
    assert!(batch.build().is_err());
}

// ==================== Cross-cutting Properties ====================

/// Every placeholder in the text has a map entry and vice versa.
fn assert_placeholder_bijection(stmt: &Statement) {
    for name in stmt.params.names() {
        assert!(
            stmt.sql.contains(&format!("@{name}")),
            "orphaned parameter {name} in {}",
            stmt.sql
        );
    }
    // Collect @-tokens from the text and check each against the map.
    let mut rest = stmt.sql.as_str();
    while let Some(at) = rest.find('@') {
        rest = &rest[at + 1..];
        let end = rest
            .find(|c: char| !(c == '_' || c.is_ascii_alphanumeric()))
            .unwrap_or(rest.len());
        let name = &rest[..end];
        assert!(
            stmt.params.get(name).is_some(),
            "placeholder @{name} missing from map"
        );
        rest = &rest[end..];
    }
}

#[test]
fn test_parameter_completeness() {
    let mut qb = SelectBuilder::new(ident("users"));
    qb.filter(Filter::new("a", Op::in_list(vec![1.into(), 2.into()])).unwrap())
        .filter(Filter::new("b", Op::IsNull).unwrap())
        .filter(Filter::new("c", Op::like("%x%")).unwrap());
    assert_placeholder_bijection(&qb.build().unwrap());

    let mut batch = BatchUpdate::new(ident("users"));
    let mut record = Record::new();
    record.set(ident("x"), 1);
    batch.push(record, vec![Filter::new("y", Op::ne(2)).unwrap()]);
    assert_placeholder_bijection(&batch.build().unwrap());
}

#[test]
fn test_build_is_deterministic() {
    let mut qb = SelectBuilder::new(ident("users"));
    qb.filter(Filter::new("status", Op::in_list(vec!["A".into(), "B".into()])).unwrap())
        .order_by(OrderTerm::asc("id").unwrap())
        .limit(10)
        .offset(20);
    let first = qb.build().unwrap();
    let second = qb.build().unwrap();
    assert_eq!(first.sql, second.sql);
    let names_a: Vec<_> = first.params.names().collect();
    let names_b: Vec<_> = second.params.names().collect();
    assert_eq!(names_a, names_b);
}
