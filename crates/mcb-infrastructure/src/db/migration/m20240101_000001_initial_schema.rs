use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(
            "CREATE TABLE projects (
                id TEXT PRIMARY KEY,
                slug TEXT NOT NULL UNIQUE,
                display_name TEXT NOT NULL,
                description TEXT,
                settings TEXT NOT NULL,
                created_at TIMESTAMP WITH TIME ZONE NOT NULL,
                updated_at TIMESTAMP WITH TIME ZONE NOT NULL
            )",
        )
        .await?;

        db.execute_unprepared(
            "CREATE TABLE sources (
                id TEXT PRIMARY KEY,
                project_id TEXT NOT NULL REFERENCES projects(id),
                source_type TEXT NOT NULL,
                connection_uri TEXT NOT NULL,
                config TEXT NOT NULL,
                last_synced_at TIMESTAMP WITH TIME ZONE,
                last_commit_sha TEXT,
                created_at TIMESTAMP WITH TIME ZONE NOT NULL
            )",
        )
        .await?;
        db.execute_unprepared("CREATE INDEX idx_sources_project ON sources(project_id)")
            .await?;

        db.execute_unprepared(
            "CREATE TABLE files (
                id TEXT PRIMARY KEY,
                project_id TEXT NOT NULL REFERENCES projects(id),
                source_id TEXT NOT NULL REFERENCES sources(id),
                path TEXT NOT NULL,
                language TEXT,
                size_bytes BIGINT NOT NULL,
                content_hash TEXT NOT NULL,
                last_indexed_at TIMESTAMP WITH TIME ZONE,
                skip_column_lineage BOOLEAN NOT NULL DEFAULT FALSE
            )",
        )
        .await?;
        db.execute_unprepared("CREATE INDEX idx_files_project ON files(project_id)")
            .await?;
        db.execute_unprepared("CREATE INDEX idx_files_source ON files(source_id)")
            .await?;
        db.execute_unprepared(
            "CREATE UNIQUE INDEX idx_files_project_path ON files(project_id, path)",
        )
        .await?;

        db.execute_unprepared(
            "CREATE TABLE symbols (
                id TEXT PRIMARY KEY,
                project_id TEXT NOT NULL REFERENCES projects(id),
                file_id TEXT NOT NULL REFERENCES files(id),
                name TEXT NOT NULL,
                qualified_name TEXT NOT NULL,
                kind TEXT NOT NULL,
                language TEXT NOT NULL,
                start_line INTEGER NOT NULL,
                end_line INTEGER NOT NULL,
                start_col INTEGER NOT NULL,
                end_col INTEGER NOT NULL,
                signature TEXT,
                doc_comment TEXT,
                metadata TEXT NOT NULL
            )",
        )
        .await?;
        db.execute_unprepared("CREATE INDEX idx_symbols_project ON symbols(project_id)")
            .await?;
        db.execute_unprepared("CREATE INDEX idx_symbols_file ON symbols(file_id)")
            .await?;
        db.execute_unprepared(
            "CREATE INDEX idx_symbols_qualified_name ON symbols(project_id, qualified_name)",
        )
        .await?;
        db.execute_unprepared("CREATE INDEX idx_symbols_name ON symbols(project_id, name)")
            .await?;

        db.execute_unprepared(
            "CREATE TABLE symbol_edges (
                id TEXT PRIMARY KEY,
                project_id TEXT NOT NULL REFERENCES projects(id),
                source_symbol_id TEXT NOT NULL REFERENCES symbols(id),
                target_symbol_id TEXT NOT NULL REFERENCES symbols(id),
                edge_type TEXT NOT NULL,
                confidence DOUBLE PRECISION NOT NULL,
                match_strategy TEXT NOT NULL,
                bridge TEXT,
                derivation_type TEXT,
                expression TEXT
            )",
        )
        .await?;
        db.execute_unprepared("CREATE INDEX idx_edges_project ON symbol_edges(project_id)")
            .await?;
        db.execute_unprepared("CREATE INDEX idx_edges_source ON symbol_edges(source_symbol_id)")
            .await?;
        db.execute_unprepared("CREATE INDEX idx_edges_target ON symbol_edges(target_symbol_id)")
            .await?;

        db.execute_unprepared(
            "CREATE TABLE column_references (
                id TEXT PRIMARY KEY,
                project_id TEXT NOT NULL REFERENCES projects(id),
                index_run_id TEXT NOT NULL,
                source_column_fqn TEXT NOT NULL,
                target_column_fqn TEXT NOT NULL,
                derivation_type TEXT NOT NULL,
                expression TEXT,
                line INTEGER
            )",
        )
        .await?;
        db.execute_unprepared(
            "CREATE INDEX idx_column_refs_run ON column_references(project_id, index_run_id)",
        )
        .await?;

        db.execute_unprepared(
            "CREATE TABLE raw_references (
                id TEXT PRIMARY KEY,
                project_id TEXT NOT NULL REFERENCES projects(id),
                file_id TEXT NOT NULL REFERENCES files(id),
                language TEXT NOT NULL,
                from_symbol TEXT,
                to_name TEXT NOT NULL,
                to_qualified TEXT,
                reference_type TEXT NOT NULL,
                confidence DOUBLE PRECISION NOT NULL,
                context TEXT
            )",
        )
        .await?;
        db.execute_unprepared("CREATE INDEX idx_raw_refs_project ON raw_references(project_id)")
            .await?;
        db.execute_unprepared("CREATE INDEX idx_raw_refs_file ON raw_references(file_id)")
            .await?;

        db.execute_unprepared(
            "CREATE TABLE index_runs (
                id TEXT PRIMARY KEY,
                project_id TEXT NOT NULL REFERENCES projects(id),
                source_id TEXT,
                status TEXT NOT NULL,
                started_at TIMESTAMP WITH TIME ZONE,
                completed_at TIMESTAMP WITH TIME ZONE,
                files_processed BIGINT NOT NULL DEFAULT 0,
                symbols_found BIGINT NOT NULL DEFAULT 0,
                edges_found BIGINT NOT NULL DEFAULT 0,
                error_message TEXT,
                total_chunks BIGINT NOT NULL DEFAULT 0,
                chunks_remaining BIGINT NOT NULL DEFAULT 0,
                resume_cursor TEXT
            )",
        )
        .await?;
        db.execute_unprepared("CREATE INDEX idx_index_runs_project ON index_runs(project_id)")
            .await?;

        db.execute_unprepared(
            "CREATE TABLE parse_errors (
                id TEXT PRIMARY KEY,
                project_id TEXT NOT NULL REFERENCES projects(id),
                file_id TEXT NOT NULL REFERENCES files(id),
                line INTEGER NOT NULL,
                column INTEGER,
                message TEXT NOT NULL,
                created_at TIMESTAMP WITH TIME ZONE NOT NULL
            )",
        )
        .await?;
        db.execute_unprepared("CREATE INDEX idx_parse_errors_file ON parse_errors(file_id)")
            .await?;

        db.execute_unprepared(
            "CREATE TABLE project_analytics (
                id TEXT PRIMARY KEY,
                project_id TEXT NOT NULL REFERENCES projects(id),
                scope TEXT NOT NULL,
                scope_id TEXT,
                computed_at TIMESTAMP WITH TIME ZONE NOT NULL,
                data TEXT NOT NULL
            )",
        )
        .await?;
        db.execute_unprepared(
            "CREATE INDEX idx_analytics_project_scope ON project_analytics(project_id, scope)",
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        for table in [
            "project_analytics",
            "parse_errors",
            "index_runs",
            "raw_references",
            "column_references",
            "symbol_edges",
            "symbols",
            "files",
            "sources",
            "projects",
        ] {
            db.execute_unprepared(&format!("DROP TABLE IF EXISTS {table}"))
                .await?;
        }
        Ok(())
    }
}
