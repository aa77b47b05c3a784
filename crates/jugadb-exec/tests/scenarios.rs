//! End-to-end scenarios (spec.md §8 "End-to-end scenarios"), one test per
//! numbered case, each driving `Executor::process` against a
//! `tempfile`-backed `Database`.

use jugadb_exec::Executor;
use jugadb_storage::Database;
use jugadb_types::ColumnValue;

fn open_db() -> (tempfile::TempDir, Database) {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open(dir.path()).unwrap();
    (dir, db)
}

fn run(exec: &mut Executor, db: &mut Database, query: &str) -> jugadb_exec::ExecutionResult {
    let result = exec.process(db, query);
    assert_eq!(result.code, 0, "query failed: {query}: {}", result.message);
    result
}

#[test]
fn scenario_1_create_and_catalog_roundtrip() {
    let (_dir, mut db) = open_db();
    let mut exec = Executor::new();

    run(&mut exec, &mut db, "CREATE TABLE users (id SERIAL PRIMKEY, name VARCHAR(50) NOT NULL, age INT CHECK age>0, is_active BOOL DEFAULT true, email VARCHAR(100));");
    run(&mut exec, &mut db, "CREATE TABLE categories (id SERIAL PRIMKEY, name VARCHAR(40) NOT NULL);");
    run(&mut exec, &mut db, "CREATE TABLE products (id SERIAL PRIMKEY, category_id INT FRNKEY REF categories(id), price INT);");
    run(&mut exec, &mut db, "CREATE TABLE orders (id SERIAL PRIMKEY, user_id INT FRNKEY REF users(id) ON DELETE CASCADE, total INT);");
    run(&mut exec, &mut db, "CREATE TABLE payments (id SERIAL PRIMKEY, order_id INT FRNKEY REF orders(id), amount INT);");

    let schema = db.find_table_schema_tc("users").expect("users table exists");
    assert_eq!(schema.column_count(), 5);

    let id_col = &schema.columns[0];
    assert_eq!(id_col.name.as_str(), "id");
    assert!(id_col.is_primary_key);
    assert!(id_col.has_sequence);
    assert!(id_col.is_unique);
    assert!(id_col.is_not_null);

    assert_eq!(schema.columns[2].check_expr.as_deref(), Some("age>0"));
    assert!(schema.columns[3].has_default);
}

#[test]
fn scenario_2_insert_and_where() {
    let (_dir, mut db) = open_db();
    let mut exec = Executor::new();

    run(&mut exec, &mut db, "CREATE TABLE users (id SERIAL PRIMKEY, age INT, is_active BOOL);");

    // (age, is_active) chosen so that age>30 => 4, is_active=false => 4,
    // and (age>25 AND (is_active=true OR age=27)) => 6.
    let fixture: [(i64, bool); 10] = [
        (22, false),
        (25, false),
        (27, true),
        (28, true),
        (29, true),
        (31, true),
        (32, true),
        (33, true),
        (40, false),
        (21, false),
    ];
    for (age, active) in fixture {
        run(&mut exec, &mut db, &format!("INSERT INTO users (age, is_active) VALUES ({age}, {active});"));
    }

    let older = run(&mut exec, &mut db, "SELECT * FROM users WHERE age > 30;");
    assert_eq!(older.row_count, 4);

    let inactive = run(&mut exec, &mut db, "SELECT * FROM users WHERE NOT is_active = true;");
    assert_eq!(inactive.row_count, 4);

    let mixed = run(&mut exec, &mut db, "SELECT * FROM users WHERE (age > 25 AND (is_active = true OR age = 27));");
    assert_eq!(mixed.row_count, 6);
}

struct Employee {
    name: &'static str,
    department: &'static str,
    salary: i64,
    email: &'static str,
    last_login: &'static str,
}

fn employee_fixture() -> Vec<Employee> {
    vec![
        Employee { name: "Alice", department: "Sales", salary: 50000, email: "alice@example.com", last_login: "2025-04-01" },
        Employee { name: "Bob", department: "Sales", salary: 51000, email: "bob@example.com", last_login: "2025-04-02" },
        Employee { name: "Carol", department: "Support", salary: 52000, email: "carol@example.com", last_login: "2025-04-03" },
        Employee { name: "Dave", department: "Support", salary: 53000, email: "dave@example.com", last_login: "2025-04-04" },
        Employee { name: "Eve", department: "Sales", salary: 54000, email: "eve@example.com", last_login: "2025-04-05" },
        Employee { name: "Frank", department: "Support", salary: 55000, email: "frank@example.com", last_login: "2025-04-06" },
        Employee { name: "Grace", department: "Sales", salary: 56000, email: "grace@example.com", last_login: "2025-04-07" },
        Employee { name: "Heidi", department: "Support", salary: 57000, email: "heidi@example.com", last_login: "2025-05-01" },
        Employee { name: "Ivan", department: "Sales", salary: 58000, email: "ivan@example.com", last_login: "2025-05-02" },
        Employee { name: "Judy", department: "Support", salary: 59000, email: "judy@example.com", last_login: "2025-05-03" },
        Employee { name: "Mallory", department: "Engineering", salary: 80000, email: "mallory@example.com", last_login: "2025-03-01" },
        Employee { name: "Oscar", department: "Engineering", salary: 95000, email: "oscar@example.com", last_login: "2025-03-02" },
        Employee { name: "Peggy", department: "Marketing", salary: 90000, email: "peggy@example.com", last_login: "2025-03-03" },
        Employee { name: "Quentin", department: "Engineering", salary: 85000, email: "quentin@example.com", last_login: "2025-03-04" },
        Employee { name: "Rupert", department: "Marketing", salary: 75000, email: "rupert@example.com", last_login: "2025-03-05" },
    ]
}

fn seed_employees(exec: &mut Executor, db: &mut Database) {
    run(
        exec,
        db,
        "CREATE TABLE employees (id SERIAL PRIMKEY, name VARCHAR(40) NOT NULL, department VARCHAR(30), salary INT, email VARCHAR(60), last_login_date VARCHAR(20));",
    );
    for e in employee_fixture() {
        run(
            exec,
            db,
            &format!(
                "INSERT INTO employees (name, department, salary, email, last_login_date) VALUES ('{}', '{}', {}, '{}', '{}');",
                e.name, e.department, e.salary, e.email, e.last_login
            ),
        );
    }
}

#[test]
fn scenario_3_order_by_and_limit() {
    let (_dir, mut db) = open_db();
    let mut exec = Executor::new();
    seed_employees(&mut exec, &mut db);

    let top3 = run(
        &mut exec,
        &mut db,
        "SELECT * FROM employees WHERE department IN (\"Engineering\", \"Marketing\") ORDER BY salary DESC LIM 3;",
    );
    assert_eq!(top3.row_count, 3);
    assert_eq!(top3.rows[0].id.row_id, 11);
}

#[test]
fn scenario_4_like_matching() {
    let (_dir, mut db) = open_db();
    let mut exec = Executor::new();
    seed_employees(&mut exec, &mut db);

    let all_emails = run(&mut exec, &mut db, "SELECT * FROM employees WHERE email LIKE '%@example.com';");
    assert_eq!(all_emails.row_count, 15);

    let starts_with_a = run(&mut exec, &mut db, "SELECT * FROM employees WHERE name LIKE 'A%';");
    assert_eq!(starts_with_a.row_count, 1);

    let april_logins = run(&mut exec, &mut db, "SELECT * FROM employees WHERE last_login_date LIKE '2025-04-%';");
    assert_eq!(april_logins.row_count, 7);
}

#[test]
fn scenario_5_array_access_and_update() {
    let (_dir, mut db) = open_db();
    let mut exec = Executor::new();

    run(&mut exec, &mut db, "CREATE TABLE user_profiles (id INT PRIMKEY, name VARCHAR(40), favorite_numbers INT[]);");
    run(&mut exec, &mut db, "INSERT INTO user_profiles (id, name, favorite_numbers) VALUES (0, 'Alice', {3,7,21});");

    run(&mut exec, &mut db, "UPDATE user_profiles SET favorite_numbers[1] = 99 WHERE id = 0;");

    let result = run(&mut exec, &mut db, "SELECT favorite_numbers[1] FROM user_profiles WHERE id = 0;");
    assert_eq!(result.row_count, 1);
    assert_eq!(result.rows[0].values[0], ColumnValue::Int(99));
}

#[test]
fn scenario_6_cascade_delete() {
    let (_dir, mut db) = open_db();
    let mut exec = Executor::new();

    run(&mut exec, &mut db, "CREATE TABLE users (id SERIAL PRIMKEY, name VARCHAR(30));");
    run(&mut exec, &mut db, "CREATE TABLE orders (id SERIAL PRIMKEY, user_id INT FRNKEY REF users(id) ON DELETE CASCADE, amount INT);");

    run(&mut exec, &mut db, "INSERT INTO users (name) VALUES ('ada');");
    run(&mut exec, &mut db, "INSERT INTO orders (user_id, amount) VALUES (0, 10);");
    run(&mut exec, &mut db, "INSERT INTO orders (user_id, amount) VALUES (0, 20);");

    let before = run(&mut exec, &mut db, "SELECT * FROM orders WHERE user_id = 0;");
    assert_eq!(before.row_count, 2);

    let delete = run(&mut exec, &mut db, "DELETE FROM users WHERE id = 0;");
    assert_eq!(delete.row_count, 1);

    let after = run(&mut exec, &mut db, "SELECT * FROM orders WHERE user_id = 0;");
    assert_eq!(after.row_count, 0);

    let orders_table = db.table("orders").expect("orders table exists");
    let btree = orders_table.primary_key.as_ref().expect("orders has a PK btree");
    assert!(btree.search(&ColumnValue::Int(0)).is_none());
    assert!(btree.search(&ColumnValue::Int(1)).is_none());
}
