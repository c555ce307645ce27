use sea_orm::{ConnectionTrait, DatabaseBackend, Statement};

/// Idempotent schema. Money columns hold integer minor units (`*_minor`),
/// timestamps are RFC 3339 UTC text with a fixed width so they compare as text.
const SCHEMA: &[(&str, &str)] = &[
    (
        "sys_sequences",
        r#"
        CREATE TABLE IF NOT EXISTS sys_sequences (
            name TEXT PRIMARY KEY NOT NULL,
            next_value INTEGER NOT NULL
        );
        "#,
    ),
    (
        "sys_sequences seed",
        "INSERT OR IGNORE INTO sys_sequences (name, next_value) VALUES ('fis_no', 1);",
    ),
    (
        "a001_work_order",
        r#"
        CREATE TABLE IF NOT EXISTS a001_work_order (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            fis_no INTEGER NOT NULL UNIQUE,
            customer_name TEXT NOT NULL,
            phone TEXT,
            customer_note TEXT,
            vehicle_brand TEXT,
            vehicle_model TEXT,
            odometer_km INTEGER,
            description TEXT,
            work_performed TEXT,
            delivery_note TEXT,
            estimated_fee_minor INTEGER NOT NULL DEFAULT 0,
            actual_fee_minor INTEGER NOT NULL DEFAULT 0,
            total_cost_minor INTEGER NOT NULL DEFAULT 0,
            margin_minor INTEGER NOT NULL DEFAULT 0,
            status TEXT NOT NULL DEFAULT 'beklemede',
            completed_at TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            created_by TEXT
        );
        "#,
    ),
    (
        "idx_a001_work_order_created_at",
        "CREATE INDEX IF NOT EXISTS idx_a001_work_order_created_at ON a001_work_order (created_at);",
    ),
    (
        "a001_work_order_part",
        r#"
        CREATE TABLE IF NOT EXISTS a001_work_order_part (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            work_order_id INTEGER NOT NULL REFERENCES a001_work_order (id) ON DELETE CASCADE,
            code TEXT,
            name TEXT NOT NULL,
            quantity INTEGER NOT NULL DEFAULT 1 CHECK (quantity >= 1),
            unit_cost_minor INTEGER NOT NULL DEFAULT 0,
            unit_sale_price_minor INTEGER NOT NULL DEFAULT 0
        );
        "#,
    ),
    (
        "idx_a001_work_order_part_order",
        "CREATE INDEX IF NOT EXISTS idx_a001_work_order_part_order ON a001_work_order_part (work_order_id);",
    ),
    (
        "a002_accessory_sale",
        r#"
        CREATE TABLE IF NOT EXISTS a002_accessory_sale (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            customer_name TEXT NOT NULL,
            phone TEXT,
            product TEXT,
            payment_method TEXT NOT NULL DEFAULT 'nakit',
            payment_details TEXT,
            total_cost_minor INTEGER NOT NULL DEFAULT 0,
            total_sale_minor INTEGER NOT NULL DEFAULT 0,
            margin_minor INTEGER NOT NULL DEFAULT 0,
            status TEXT NOT NULL DEFAULT 'beklemede',
            completed_at TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            created_by TEXT
        );
        "#,
    ),
    (
        "idx_a002_accessory_sale_created_at",
        "CREATE INDEX IF NOT EXISTS idx_a002_accessory_sale_created_at ON a002_accessory_sale (created_at);",
    ),
    (
        "a002_accessory_sale_part",
        r#"
        CREATE TABLE IF NOT EXISTS a002_accessory_sale_part (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            accessory_sale_id INTEGER NOT NULL REFERENCES a002_accessory_sale (id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            quantity INTEGER NOT NULL DEFAULT 1 CHECK (quantity >= 1),
            unit_cost_minor INTEGER NOT NULL DEFAULT 0,
            unit_sale_price_minor INTEGER NOT NULL DEFAULT 0
        );
        "#,
    ),
    (
        "idx_a002_accessory_sale_part_sale",
        "CREATE INDEX IF NOT EXISTS idx_a002_accessory_sale_part_sale ON a002_accessory_sale_part (accessory_sale_id);",
    ),
    (
        "a003_expense",
        r#"
        CREATE TABLE IF NOT EXISTS a003_expense (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            description TEXT NOT NULL,
            amount_minor INTEGER NOT NULL,
            category TEXT NOT NULL DEFAULT 'genel',
            expense_date TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            created_by TEXT
        );
        "#,
    ),
    (
        "idx_a003_expense_date",
        "CREATE INDEX IF NOT EXISTS idx_a003_expense_date ON a003_expense (expense_date);",
    ),
    (
        "a004_customer",
        r#"
        CREATE TABLE IF NOT EXISTS a004_customer (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            full_name TEXT NOT NULL,
            phone TEXT,
            email TEXT,
            address TEXT,
            notes TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            created_by TEXT
        );
        "#,
    ),
    (
        "sys_users",
        r#"
        CREATE TABLE IF NOT EXISTS sys_users (
            id TEXT PRIMARY KEY NOT NULL,
            username TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            full_name TEXT,
            role TEXT NOT NULL DEFAULT 'user',
            is_approved INTEGER NOT NULL DEFAULT 0,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            last_login_at TEXT,
            approved_by TEXT
        );
        "#,
    ),
    (
        "sys_settings",
        r#"
        CREATE TABLE IF NOT EXISTS sys_settings (
            key TEXT PRIMARY KEY NOT NULL,
            value TEXT NOT NULL,
            description TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    ),
    (
        "sys_activity_log",
        r#"
        CREATE TABLE IF NOT EXISTS sys_activity_log (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            timestamp TEXT NOT NULL,
            user_id TEXT,
            username TEXT,
            action TEXT NOT NULL,
            entity TEXT NOT NULL,
            entity_id TEXT,
            details TEXT,
            ip_address TEXT
        );
        "#,
    ),
    (
        "sys_print_layouts",
        r#"
        CREATE TABLE IF NOT EXISTS sys_print_layouts (
            layout_key TEXT PRIMARY KEY NOT NULL,
            document_json TEXT NOT NULL,
            version INTEGER NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    ),
];

/// Create missing tables, indexes and sequence rows. Safe to run on every start.
pub async fn bootstrap<C: ConnectionTrait>(conn: &C) -> anyhow::Result<()> {
    for (name, sql) in SCHEMA {
        conn.execute(Statement::from_string(DatabaseBackend::Sqlite, sql.to_string()))
            .await
            .map_err(|e| anyhow::anyhow!("schema step '{}' failed: {}", name, e))?;
    }
    tracing::debug!("Schema bootstrap applied ({} steps)", SCHEMA.len());
    Ok(())
}
