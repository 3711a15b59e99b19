//! MCP service implementation using rmcp.
//!
//! This module defines the GateService struct with all database tools
//! exposed via the MCP protocol using the rmcp framework's macros. Tool
//! handlers validate input shape, hand the description to the sqlgate
//! builders, and run the resulting statement on a pooled connection (or an
//! open transaction's pinned connection).

use crate::config::Config;
use crate::inputs::*;
use crate::registry::TransactionRegistry;
use rmcp::{
    ErrorData as McpError, Json, ServerHandler,
    handler::server::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::{Implementation, ProtocolVersion, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
};
use sqlgate::{
    BatchDelete, BatchInsert, BatchUpdate, DeleteBuilder, GateError, GateResult, InsertBuilder,
    ProcCall, QueryOutput, SelectBuilder, Statement, StatementBuilder, UpdateBuilder, Value,
    import, introspect,
    pool::TdsPool,
};
use std::future::Future;
use std::sync::Arc;

/// Map a core error onto the MCP error surface.
///
/// Caller mistakes (validation, unknown ids, bad payloads) come back as
/// invalid-params so the agent can fix its call; everything else is an
/// internal error.
fn mcp_error(err: GateError) -> McpError {
    match &err {
        GateError::Validation(_) | GateError::NotFound(_) | GateError::Import(_) => {
            McpError::invalid_params(err.to_string(), None)
        }
        _ => McpError::internal_error(err.to_string(), None),
    }
}

#[derive(Clone)]
pub struct GateService {
    pool: TdsPool,
    registry: Arc<TransactionRegistry>,
    config: Config,
    /// Tool router for MCP tool dispatch (auto-generated)
    tool_router: ToolRouter<Self>,
}

impl GateService {
    pub fn new(pool: TdsPool, config: Config) -> Self {
        Self {
            pool,
            registry: Arc::new(TransactionRegistry::new()),
            config,
            tool_router: Self::tool_router(),
        }
    }

    async fn with_timeout<T>(&self, fut: impl Future<Output = GateResult<T>>) -> GateResult<T> {
        match tokio::time::timeout(self.config.query_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(GateError::Timeout(self.config.query_timeout)),
        }
    }

    /// Run a row-returning statement, on the named transaction's pinned
    /// connection when given, applying the configured row ceiling.
    async fn fetch(&self, stmt: &Statement, tx: Option<&str>) -> GateResult<QueryOutput> {
        let mut output = self
            .with_timeout(async {
                match tx {
                    Some(id) => self.registry.fetch_in(id, stmt).await,
                    None => {
                        let mut conn = self.pool.get().await?;
                        stmt.fetch(&mut *conn).await
                    }
                }
            })
            .await?;
        output.truncate(self.config.max_rows);
        Ok(output)
    }

    /// Run a mutation, on the named transaction's pinned connection when
    /// given.
    async fn execute(&self, stmt: &Statement, tx: Option<&str>) -> GateResult<u64> {
        self.with_timeout(async {
            match tx {
                Some(id) => self.registry.execute_in(id, stmt).await,
                None => {
                    let mut conn = self.pool.get().await?;
                    stmt.execute(&mut *conn).await
                }
            }
        })
        .await
    }
}

#[tool_router]
impl GateService {
    // =========================================================================
    // CRUD Tools
    // =========================================================================

    #[tool(
        description = "Read rows from a table.\nSupports column projection, filters (AND-combined), joins, ordering, and limit/offset pagination.\nOffset pagination requires order_by. Results are capped at the server's row ceiling."
    )]
    async fn read_rows(
        &self,
        Parameters(input): Parameters<ReadRowsInput>,
    ) -> Result<Json<RowsOutput>, McpError> {
        let mut qb = SelectBuilder::new(parse_table(&input.table).map_err(mcp_error)?);
        if let Some(columns) = &input.columns {
            for column in columns {
                qb.column(sqlgate::Ident::parse(column).map_err(mcp_error)?);
            }
        }
        if let Some(joins) = &input.joins {
            for join in joins {
                qb.join(join.to_join().map_err(mcp_error)?);
            }
        }
        if let Some(filters) = &input.filters {
            qb.filters(to_filters(filters).map_err(mcp_error)?);
        }
        if let Some(order) = &input.order_by {
            for term in order {
                qb.order_by(term.to_order_term().map_err(mcp_error)?);
            }
        }
        if let Some(limit) = input.limit {
            qb.limit(limit);
        }
        if let Some(offset) = input.offset {
            qb.offset(offset);
        }

        let stmt = qb.build().map_err(mcp_error)?;
        let output = self
            .fetch(&stmt, input.transaction_id.as_deref())
            .await
            .map_err(mcp_error)?;
        Ok(Json(output.into()))
    }

    #[tool(description = "Insert one row into a table.\nTakes a column → value object.")]
    async fn insert_row(
        &self,
        Parameters(input): Parameters<InsertRowInput>,
    ) -> Result<Json<MutationOutput>, McpError> {
        let table = parse_table(&input.table).map_err(mcp_error)?;
        let record = parse_record(&input.row, "Inserted row").map_err(mcp_error)?;
        let stmt = InsertBuilder::from_record(table, record)
            .build()
            .map_err(mcp_error)?;
        let rows_affected = self
            .execute(&stmt, input.transaction_id.as_deref())
            .await
            .map_err(mcp_error)?;
        Ok(Json(MutationOutput { rows_affected }))
    }

    #[tool(
        description = "Update rows in a table.\nTakes a column → new-value object plus filters selecting the rows; filters are required."
    )]
    async fn update_rows(
        &self,
        Parameters(input): Parameters<UpdateRowsInput>,
    ) -> Result<Json<MutationOutput>, McpError> {
        let table = parse_table(&input.table).map_err(mcp_error)?;
        let record = parse_record(&input.set, "SET object").map_err(mcp_error)?;
        let filters = to_filters(&input.filters).map_err(mcp_error)?;
        let stmt = UpdateBuilder::from_parts(table, record, filters)
            .build()
            .map_err(mcp_error)?;
        let rows_affected = self
            .execute(&stmt, input.transaction_id.as_deref())
            .await
            .map_err(mcp_error)?;
        Ok(Json(MutationOutput { rows_affected }))
    }

    #[tool(
        description = "Delete rows from a table.\nFilters selecting the rows are required; full-table deletes are not exposed."
    )]
    async fn delete_rows(
        &self,
        Parameters(input): Parameters<DeleteRowsInput>,
    ) -> Result<Json<MutationOutput>, McpError> {
        let table = parse_table(&input.table).map_err(mcp_error)?;
        let filters = to_filters(&input.filters).map_err(mcp_error)?;
        let stmt = DeleteBuilder::from_filters(table, filters)
            .build()
            .map_err(mcp_error)?;
        let rows_affected = self
            .execute(&stmt, input.transaction_id.as_deref())
            .await
            .map_err(mcp_error)?;
        Ok(Json(MutationOutput { rows_affected }))
    }

    // =========================================================================
    // Batch Tools
    // =========================================================================

    #[tool(
        description = "Insert many rows into a table in one batched execution.\nTakes an array of column → value objects."
    )]
    async fn insert_batch(
        &self,
        Parameters(input): Parameters<InsertBatchInput>,
    ) -> Result<Json<MutationOutput>, McpError> {
        let table = parse_table(&input.table).map_err(mcp_error)?;
        let mut batch = BatchInsert::new(table);
        for (i, row) in input.rows.iter().enumerate() {
            let record = parse_record(row, &format!("Row {i}")).map_err(mcp_error)?;
            batch.push(record);
        }
        let stmt = batch.build().map_err(mcp_error)?;
        let rows_affected = self
            .execute(&stmt, input.transaction_id.as_deref())
            .await
            .map_err(mcp_error)?;
        Ok(Json(MutationOutput { rows_affected }))
    }

    #[tool(
        description = "Apply many updates to a table in one batched execution.\nEach entry carries its own SET object and filters."
    )]
    async fn update_batch(
        &self,
        Parameters(input): Parameters<UpdateBatchInput>,
    ) -> Result<Json<MutationOutput>, McpError> {
        let table = parse_table(&input.table).map_err(mcp_error)?;
        let mut batch = BatchUpdate::new(table);
        for (i, entry) in input.entries.iter().enumerate() {
            let record = parse_record(&entry.set, &format!("Entry {i} SET object"))
                .map_err(mcp_error)?;
            let filters = to_filters(&entry.filters).map_err(mcp_error)?;
            batch.push(record, filters);
        }
        let stmt = batch.build().map_err(mcp_error)?;
        let rows_affected = self
            .execute(&stmt, input.transaction_id.as_deref())
            .await
            .map_err(mcp_error)?;
        Ok(Json(MutationOutput { rows_affected }))
    }

    #[tool(
        description = "Apply many deletes to a table in one batched execution.\nEach entry is a filter list selecting rows to delete."
    )]
    async fn delete_batch(
        &self,
        Parameters(input): Parameters<DeleteBatchInput>,
    ) -> Result<Json<MutationOutput>, McpError> {
        let table = parse_table(&input.table).map_err(mcp_error)?;
        let mut batch = BatchDelete::new(table);
        for entry in &input.entries {
            batch.push(to_filters(entry).map_err(mcp_error)?);
        }
        let stmt = batch.build().map_err(mcp_error)?;
        let rows_affected = self
            .execute(&stmt, input.transaction_id.as_deref())
            .await
            .map_err(mcp_error)?;
        Ok(Json(MutationOutput { rows_affected }))
    }

    // =========================================================================
    // Schema Introspection Tools
    // =========================================================================

    #[tool(description = "List tables and views, optionally restricted to one schema.")]
    async fn list_tables(
        &self,
        Parameters(input): Parameters<ListTablesInput>,
    ) -> Result<Json<RowsOutput>, McpError> {
        let stmt = introspect::list_tables(input.schema.as_deref());
        let output = self.fetch(&stmt, None).await.map_err(mcp_error)?;
        Ok(Json(output.into()))
    }

    #[tool(description = "Describe a table's columns: name, type, nullability, default.")]
    async fn describe_table(
        &self,
        Parameters(input): Parameters<TableInput>,
    ) -> Result<Json<RowsOutput>, McpError> {
        let table = parse_table(&input.table).map_err(mcp_error)?;
        let stmt = introspect::table_columns(&table);
        let output = self.fetch(&stmt, None).await.map_err(mcp_error)?;
        Ok(Json(output.into()))
    }

    #[tool(description = "List a table's indexes and their key columns.")]
    async fn list_indexes(
        &self,
        Parameters(input): Parameters<TableInput>,
    ) -> Result<Json<RowsOutput>, McpError> {
        let table = parse_table(&input.table).map_err(mcp_error)?;
        let stmt = introspect::table_indexes(&table);
        let output = self.fetch(&stmt, None).await.map_err(mcp_error)?;
        Ok(Json(output.into()))
    }

    #[tool(description = "List a table's foreign keys and the columns they reference.")]
    async fn list_foreign_keys(
        &self,
        Parameters(input): Parameters<TableInput>,
    ) -> Result<Json<RowsOutput>, McpError> {
        let table = parse_table(&input.table).map_err(mcp_error)?;
        let stmt = introspect::foreign_keys(&table);
        let output = self.fetch(&stmt, None).await.map_err(mcp_error)?;
        Ok(Json(output.into()))
    }

    // =========================================================================
    // Stored Procedures
    // =========================================================================

    #[tool(
        description = "Call a stored procedure with named scalar arguments.\nReturns the procedure's first result set (possibly empty)."
    )]
    async fn call_procedure(
        &self,
        Parameters(input): Parameters<CallProcedureInput>,
    ) -> Result<Json<RowsOutput>, McpError> {
        let proc = parse_table(&input.procedure).map_err(mcp_error)?;
        let mut call = ProcCall::new(proc);
        if let Some(arguments) = &input.arguments {
            for (name, json) in arguments {
                let value = Value::from_json(json).map_err(mcp_error)?;
                call.arg(name.clone(), value);
            }
        }
        let stmt = call.build().map_err(mcp_error)?;
        let output = self
            .fetch(&stmt, input.transaction_id.as_deref())
            .await
            .map_err(mcp_error)?;
        Ok(Json(output.into()))
    }

    // =========================================================================
    // Transaction Tools
    // =========================================================================

    #[tool(
        description = "Begin a transaction on a dedicated connection.\nReturns a transaction_id accepted by the other tools."
    )]
    async fn begin_transaction(&self) -> Result<Json<BeginTransactionOutput>, McpError> {
        let transaction_id = self.registry.begin(&self.pool).await.map_err(mcp_error)?;
        Ok(Json(BeginTransactionOutput { transaction_id }))
    }

    #[tool(description = "Commit a transaction and release its connection.")]
    async fn commit_transaction(
        &self,
        Parameters(input): Parameters<TransactionIdInput>,
    ) -> Result<Json<TransactionOutput>, McpError> {
        self.registry
            .commit(&input.transaction_id)
            .await
            .map_err(mcp_error)?;
        Ok(Json(TransactionOutput {
            transaction_id: input.transaction_id,
            status: "committed".to_string(),
        }))
    }

    #[tool(description = "Roll back a transaction and release its connection.")]
    async fn rollback_transaction(
        &self,
        Parameters(input): Parameters<TransactionIdInput>,
    ) -> Result<Json<TransactionOutput>, McpError> {
        self.registry
            .rollback(&input.transaction_id)
            .await
            .map_err(mcp_error)?;
        Ok(Json(TransactionOutput {
            transaction_id: input.transaction_id,
            status: "rolled_back".to_string(),
        }))
    }

    #[tool(description = "Create a named savepoint inside an open transaction.")]
    async fn savepoint(
        &self,
        Parameters(input): Parameters<SavepointInput>,
    ) -> Result<Json<TransactionOutput>, McpError> {
        self.registry
            .savepoint(&input.transaction_id, &input.name)
            .await
            .map_err(mcp_error)?;
        Ok(Json(TransactionOutput {
            transaction_id: input.transaction_id,
            status: "savepoint_created".to_string(),
        }))
    }

    #[tool(
        description = "Roll back to a named savepoint, keeping the transaction open."
    )]
    async fn rollback_to_savepoint(
        &self,
        Parameters(input): Parameters<SavepointInput>,
    ) -> Result<Json<TransactionOutput>, McpError> {
        self.registry
            .rollback_to_savepoint(&input.transaction_id, &input.name)
            .await
            .map_err(mcp_error)?;
        Ok(Json(TransactionOutput {
            transaction_id: input.transaction_id,
            status: "rolled_back_to_savepoint".to_string(),
        }))
    }

    // =========================================================================
    // Bulk Load
    // =========================================================================

    #[tool(
        description = "Bulk-load rows into a table from inline JSON (array of objects) or CSV text (header row required).\nCSV cells can be coerced with column_types; rows are inserted in batched chunks."
    )]
    async fn import_rows(
        &self,
        Parameters(input): Parameters<ImportRowsInput>,
    ) -> Result<Json<ImportOutput>, McpError> {
        let table = parse_table(&input.table).map_err(mcp_error)?;
        let records = match input.format {
            ImportFormat::Json => import::records_from_json(&input.data).map_err(mcp_error)?,
            ImportFormat::Csv => {
                let types = input.parsed_column_types().map_err(mcp_error)?;
                import::records_from_csv(&input.data, &types).map_err(mcp_error)?
            }
        };
        let rows_parsed = records.len();
        let statements = import::chunked_inserts(&table, records, self.config.import_chunk_size)
            .map_err(mcp_error)?;

        let mut rows_affected = 0u64;
        match input.transaction_id.as_deref() {
            Some(id) => {
                for stmt in &statements {
                    rows_affected += self
                        .with_timeout(self.registry.execute_in(id, stmt))
                        .await
                        .map_err(mcp_error)?;
                }
            }
            None => {
                // One connection for the whole import.
                let result: GateResult<u64> = self
                    .with_timeout(async {
                        let mut conn = self.pool.get().await?;
                        let mut total = 0u64;
                        for stmt in &statements {
                            total += stmt.execute(&mut *conn).await?;
                        }
                        Ok(total)
                    })
                    .await;
                rows_affected = result.map_err(mcp_error)?;
            }
        }

        Ok(Json(ImportOutput {
            rows_parsed,
            statements_executed: statements.len(),
            rows_affected,
        }))
    }
}

#[tool_handler]
impl ServerHandler for GateService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_03_26,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "sqlgate-mcp".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(
                "SQL Server database operations.\n\n\
                ## Workflow\n\
                1. Discover structure with list_tables / describe_table / list_indexes / list_foreign_keys\n\
                2. Read data with read_rows (filters, joins, ordering, limit/offset)\n\
                3. Write with insert_row / update_rows / delete_rows, or the *_batch variants\n\
                4. Group writes with begin_transaction → ... → commit_transaction (or rollback)\n\n\
                ## Notes\n\
                - Filter values are always bound as parameters; join ON expressions are raw SQL text\n\
                - update_rows and delete_rows require filters\n\
                - Offset pagination requires order_by\n\
                - read_rows results are capped at the server's configured row ceiling"
                    .to_string(),
            ),
        }
    }
}
