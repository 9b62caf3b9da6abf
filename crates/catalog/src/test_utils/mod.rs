// Copyright (c) confluxdb.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use std::collections::HashMap;

use conflux_core::Type;
use conflux_core::interface::{
    ColumnDef, ColumnId, ColumnIndex, PrimaryKeyDef, RoutineDef, RoutineId, TableDef,
    TableFunctionDef, TableId, TableKind,
};

use crate::CatalogTx;

/// In-memory catalog for tests. Names resolve against plain maps; ids are
/// handed out in registration order.
#[derive(Debug, Default)]
pub struct TestCatalog {
    tables: HashMap<String, TableDef>,
    functions: HashMap<String, TableFunctionDef>,
    routines: HashMap<String, RoutineDef>,
    synonyms: HashMap<String, String>,
    next_table_id: u64,
    next_column_id: u64,
    next_routine_id: u64,
}

impl TestCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, name: &str, columns: &[(&str, Type)]) -> Self {
        self.add_table(name, TableKind::Base, columns, &[]);
        self
    }

    pub fn with_table_of_kind(mut self, name: &str, kind: TableKind, columns: &[(&str, Type)]) -> Self {
        self.add_table(name, kind, columns, &[]);
        self
    }

    pub fn with_keyed_table(
        mut self,
        name: &str,
        columns: &[(&str, Type)],
        primary_key: &[&str],
    ) -> Self {
        self.add_table(name, TableKind::Base, columns, primary_key);
        self
    }

    pub fn with_table_function(mut self, name: &str, columns: &[(&str, Type)]) -> Self {
        let id = RoutineId(self.next_routine_id);
        self.next_routine_id += 1;
        let columns = self.make_columns(columns);
        self.functions.insert(name.to_string(), TableFunctionDef {
            id,
            name: name.to_string(),
            columns,
        });
        self
    }

    pub fn with_routine(mut self, name: &str, returns: Type) -> Self {
        let id = RoutineId(self.next_routine_id);
        self.next_routine_id += 1;
        self.routines.insert(name.to_string(), RoutineDef {
            id,
            name: name.to_string(),
            returns,
        });
        self
    }

    pub fn with_synonym(mut self, name: &str, stands_for: &str) -> Self {
        self.synonyms.insert(name.to_string(), stands_for.to_string());
        self
    }

    fn add_table(&mut self, name: &str, kind: TableKind, columns: &[(&str, Type)], primary_key: &[&str]) {
        let id = TableId(self.next_table_id);
        self.next_table_id += 1;
        let columns = self.make_columns(columns);
        let primary_key = if primary_key.is_empty() {
            None
        } else {
            Some(PrimaryKeyDef {
                columns: primary_key
                    .iter()
                    .map(|key| {
                        columns
                            .iter()
                            .find(|column| column.name == *key)
                            .map(|column| column.id)
                            .expect("primary key column must exist")
                    })
                    .collect(),
            })
        };
        self.tables.insert(name.to_string(), TableDef {
            id,
            name: name.to_string(),
            kind,
            columns,
            primary_key,
        });
    }

    fn make_columns(&mut self, columns: &[(&str, Type)]) -> Vec<ColumnDef> {
        columns
            .iter()
            .enumerate()
            .map(|(index, (name, ty))| {
                let id = ColumnId(self.next_column_id);
                self.next_column_id += 1;
                ColumnDef {
                    id,
                    name: name.to_string(),
                    ty: ty.clone(),
                    index: ColumnIndex(index as u16),
                }
            })
            .collect()
    }
}

impl CatalogTx for TestCatalog {
    fn find_table_by_name(&mut self, name: &str) -> crate::Result<Option<TableDef>> {
        Ok(self.tables.get(name).cloned())
    }

    fn find_table_function_by_name(&mut self, name: &str) -> crate::Result<Option<TableFunctionDef>> {
        Ok(self.functions.get(name).cloned())
    }

    fn find_routine_by_name(&mut self, name: &str) -> crate::Result<Option<RoutineDef>> {
        Ok(self.routines.get(name).cloned())
    }

    fn resolve_synonym(&mut self, name: &str) -> crate::Result<Option<String>> {
        Ok(self.synonyms.get(name).cloned())
    }
}

#[cfg(test)]
mod tests {
    mod find_table_by_name {
        use conflux_core::Type;
        use conflux_core::interface::TableKind;

        use crate::CatalogTx;
        use crate::test_utils::TestCatalog;

        #[test]
        fn test_ok() {
            let mut catalog = TestCatalog::new()
                .with_table("t1", &[("a", Type::Int4), ("b", Type::Utf8)]);

            let table = catalog.find_table_by_name("t1").unwrap().unwrap();

            assert_eq!(table.name, "t1");
            assert_eq!(table.kind, TableKind::Base);
            assert_eq!(table.columns.len(), 2);
            assert_eq!(table.columns[1].name, "b");
            assert_eq!(table.columns[1].index, 1);
        }

        #[test]
        fn test_not_found() {
            let mut catalog = TestCatalog::new();
            assert_eq!(catalog.find_table_by_name("t1").unwrap(), None);
        }
    }

    mod resolve_synonym {
        use crate::CatalogTx;
        use crate::test_utils::TestCatalog;

        #[test]
        fn test_ok() {
            let mut catalog = TestCatalog::new().with_synonym("s", "t1");
            assert_eq!(catalog.resolve_synonym("s").unwrap(), Some("t1".to_string()));
            assert_eq!(catalog.resolve_synonym("t1").unwrap(), None);
        }
    }

    mod primary_key {
        use conflux_core::Type;

        use crate::CatalogTx;
        use crate::test_utils::TestCatalog;

        #[test]
        fn test_columns_resolved() {
            let mut catalog = TestCatalog::new().with_keyed_table(
                "t1",
                &[("id", Type::Int8), ("payload", Type::Utf8)],
                &["id"],
            );

            let table = catalog.find_table_by_name("t1").unwrap().unwrap();
            let pk = table.primary_key.unwrap();
            assert_eq!(pk.columns, vec![table.columns[0].id]);
        }
    }
}
