// DDL for project databases and per-application event schemas
//
// The project database is created through a bootstrap connection first;
// the per-app schemas and ODS event tables are then created inside it.

/// Statement creating the project database
pub fn create_database(database_name: &str) -> String {
    format!("CREATE DATABASE {}", quote_ident(database_name))
}

/// Statements creating one schema plus its ODS event table per application
pub fn create_schemas(app_ids: &[String], ods_table_name: &str) -> Vec<String> {
    let mut statements = Vec::with_capacity(app_ids.len() * 2);
    for app_id in app_ids {
        let schema = quote_ident(app_id);
        statements.push(format!("CREATE SCHEMA IF NOT EXISTS {schema}"));
        statements.push(create_ods_table(app_id, ods_table_name));
    }
    statements
}

/// ODS event table, wide event layout with semi-structured columns
fn create_ods_table(app_id: &str, ods_table_name: &str) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {}.{}(\
         app_info SUPER, \
         device SUPER, \
         ecommerce SUPER, \
         event_bundle_sequence_id BIGINT, \
         event_date DATE, \
         event_dimensions SUPER, \
         event_id VARCHAR(255), \
         event_name VARCHAR(255), \
         event_params SUPER, \
         event_previous_timestamp BIGINT, \
         event_server_timestamp_offset BIGINT, \
         event_timestamp BIGINT, \
         event_value_in_usd VARCHAR(255), \
         geo SUPER, \
         ingest_timestamp BIGINT, \
         items SUPER, \
         platform VARCHAR(255), \
         privacy_info SUPER, \
         project_id VARCHAR(255), \
         traffic_source SUPER, \
         user_first_touch_timestamp BIGINT, \
         user_id VARCHAR(255), \
         user_ltv SUPER, \
         user_properties SUPER, \
         user_pseudo_id VARCHAR(255)\
         ) DISTSTYLE AUTO SORTKEY(event_timestamp)",
        quote_ident(app_id),
        quote_ident(ods_table_name)
    )
}

fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_statement_quotes_the_name() {
        assert_eq!(create_database("proj_1"), "CREATE DATABASE \"proj_1\"");
    }

    #[test]
    fn two_statements_per_app() {
        let statements = create_schemas(&["app1".into(), "app2".into()], "ods_events");
        assert_eq!(statements.len(), 4);
        assert_eq!(statements[0], "CREATE SCHEMA IF NOT EXISTS \"app1\"");
        assert!(statements[1].starts_with("CREATE TABLE IF NOT EXISTS \"app1\".\"ods_events\"("));
        assert!(statements[1].contains("SORTKEY(event_timestamp)"));
        assert_eq!(statements[2], "CREATE SCHEMA IF NOT EXISTS \"app2\"");
    }

    #[test]
    fn no_apps_no_statements() {
        assert!(create_schemas(&[], "ods_events").is_empty());
    }

    #[test]
    fn embedded_quotes_are_escaped() {
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }
}
