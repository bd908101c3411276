//! C2 — Attribute Registry.
//!
//! Two closed, case-insensitive sets of identifiers: scalar field
//! ("attribute") names and AST node-type names, as found in PostgreSQL's
//! `parsenodes.h`/`primnodes.h` and mirrored by `pg_query`'s generated
//! protobuf schema. The pattern parser (`pattern::parser`) uses these, and
//! only these, to decide whether a bare identifier in a pattern denotes an
//! attribute matcher, a node-type matcher, or falls through to a literal.
//!
//! There is no heuristic fallback: membership is the entire contract.

use std::collections::HashSet;
use std::sync::OnceLock;

/// ~120 scalar field names that appear across PostgreSQL AST node types.
const ATTRIBUTE_NAMES: &[&str] = &[
    "relname",
    "schemaname",
    "catalogname",
    "aliasname",
    "colname",
    "conname",
    "cursor_name",
    "defname",
    "indexname",
    "objname",
    "database",
    "tablespacename",
    "extname",
    "opfname",
    "fdwname",
    "srvname",
    "rolename",
    "funcname",
    "typemod",
    "sval",
    "ival",
    "fval",
    "boolval",
    "str",
    "location",
    "val",
    "number",
    "relpersistence",
    "inhcount",
    "is_local",
    "is_not_null",
    "is_from_type",
    "storage",
    "identity",
    "generated",
    "stmt_len",
    "stmt_location",
    "contype",
    "cooked_default",
    "collclause",
    "inhopt",
    "concurrent",
    "missing_ok",
    "if_not_exists",
    "unique",
    "primary",
    "deferrable",
    "initdeferred",
    "nulls_not_distinct",
    "skip_validation",
    "initially_valid",
    "is_no_inherit",
    "raw_expr",
    "cooked_expr",
    "keys",
    "including",
    "exclusions",
    "options",
    "indexspace",
    "reset_default_tblspc",
    "access_method",
    "accessmethod",
    "whereClause",
    "name",
    "namespace",
    "arg",
    "args",
    "fargs",
    "agg_order",
    "agg_filter",
    "agg_within_group",
    "agg_star",
    "agg_distinct",
    "func_variadic",
    "over",
    "xpr",
    "paramid",
    "paramkind",
    "rtekind",
    "jointype",
    "isnatural",
    "larg",
    "rarg",
    "usingClause",
    "quals",
    "alias",
    "colnames",
    "subquery",
    "sample",
    "ordinality",
    "is_rowsrc",
    "functions",
    "funccolnames",
    "funccoltypes",
    "lateral",
    "values_lists",
    "relation",
    "cols",
    "selectStmt",
    "override",
    "onConflictClause",
    "returningList",
    "withClause",
    "distinctClause",
    "targetList",
    "fromClause",
    "groupClause",
    "groupDistinct",
    "havingClause",
    "windowClause",
    "valuesLists",
    "sortClause",
    "limitOffset",
    "limitCount",
    "limitOption",
    "lockingClause",
    "op",
    "all",
    "indirection",
    "typeName",
    "subtype",
    "def",
    "behavior",
    "newname",
    "newowner",
    "newschema",
    "objtype",
    "removeType",
    "cascade",
    "kind",
    "table_elts",
    "tableElts",
    "inh",
    "colcollname",
    "compute_columns",
];

/// ~200 AST node-type names (the single-key tags used by `pg_query`'s
/// generated protobuf `NodeEnum`/`NodeRef`).
const NODE_TYPE_NAMES: &[&str] = &[
    "SelectStmt",
    "InsertStmt",
    "UpdateStmt",
    "DeleteStmt",
    "MergeStmt",
    "CreateStmt",
    "CreateTableAsStmt",
    "CreateSchemaStmt",
    "CreateSeqStmt",
    "AlterSeqStmt",
    "CreateFunctionStmt",
    "AlterFunctionStmt",
    "CreateTrigStmt",
    "CreateEventTrigStmt",
    "AlterEventTrigStmt",
    "CreatePLangStmt",
    "CreateRoleStmt",
    "AlterRoleStmt",
    "AlterRoleSetStmt",
    "DropRoleStmt",
    "CreateDomainStmt",
    "CreateOpClassStmt",
    "CreateOpFamilyStmt",
    "AlterOpFamilyStmt",
    "AlterEnumStmt",
    "ViewStmt",
    "LoadStmt",
    "CreatedbStmt",
    "AlterDatabaseStmt",
    "AlterDatabaseSetStmt",
    "DropdbStmt",
    "VacuumStmt",
    "ExplainStmt",
    "CreateTableSpaceStmt",
    "DropTableSpaceStmt",
    "AlterObjectDependsStmt",
    "AlterObjectSchemaStmt",
    "AlterOwnerStmt",
    "AlterOperatorStmt",
    "AlterTypeStmt",
    "DropStmt",
    "TruncateStmt",
    "CommentStmt",
    "SecLabelStmt",
    "DeclareCursorStmt",
    "ClosePortalStmt",
    "FetchStmt",
    "IndexStmt",
    "CreateStatsStmt",
    "AlterStatsStmt",
    "CreateFdwStmt",
    "AlterFdwStmt",
    "CreateForeignServerStmt",
    "AlterForeignServerStmt",
    "CreateForeignTableStmt",
    "CreateUserMappingStmt",
    "AlterUserMappingStmt",
    "DropUserMappingStmt",
    "CreateMaterializedViewStmt",
    "RefreshMatViewStmt",
    "AccessPriv",
    "GrantStmt",
    "GrantRoleStmt",
    "AlterDefaultPrivilegesStmt",
    "DefineStmt",
    "CompositeTypeStmt",
    "CreateEnumStmt",
    "CreateRangeStmt",
    "AlterTableStmt",
    "AlterTableCmd",
    "AlterTableMoveAllStmt",
    "AlterSystemStmt",
    "CreateCastStmt",
    "CreateConversionStmt",
    "CreateTransformStmt",
    "PrepareStmt",
    "ExecuteStmt",
    "DeallocateStmt",
    "LockStmt",
    "ConstraintsSetStmt",
    "ReindexStmt",
    "CheckPointStmt",
    "AlterExtensionStmt",
    "AlterExtensionContentsStmt",
    "CreateExtensionStmt",
    "DropOwnedStmt",
    "ReassignOwnedStmt",
    "AlterTSDictionaryStmt",
    "AlterTSConfigurationStmt",
    "PublicationObjSpec",
    "PublicationTable",
    "CreatePublicationStmt",
    "AlterPublicationStmt",
    "CreateSubscriptionStmt",
    "AlterSubscriptionStmt",
    "DropSubscriptionStmt",
    "DoStmt",
    "CallStmt",
    "RenameStmt",
    "NotifyStmt",
    "ListenStmt",
    "UnlistenStmt",
    "TransactionStmt",
    "ImportForeignSchemaStmt",
    "ClusterStmt",
    "VacuumRelation",
    "CopyStmt",
    "VariableSetStmt",
    "VariableShowStmt",
    "A_Const",
    "A_Expr",
    "A_Indices",
    "A_Indirection",
    "A_ArrayExpr",
    "A_Star",
    "BoolExpr",
    "BooleanTest",
    "NullTest",
    "CaseExpr",
    "CaseWhen",
    "CoalesceExpr",
    "MinMaxExpr",
    "ColumnRef",
    "ColumnDef",
    "CommonTableExpr",
    "Constraint",
    "DefElem",
    "FuncCall",
    "FunctionParameter",
    "GroupingSet",
    "IndexElem",
    "InferClause",
    "JoinExpr",
    "List",
    "LockingClause",
    "MultiAssignRef",
    "NamedArgExpr",
    "ObjectWithArgs",
    "OnConflictClause",
    "ParamRef",
    "PartitionBoundSpec",
    "PartitionCmd",
    "PartitionElem",
    "PartitionRangeDatum",
    "PartitionSpec",
    "RangeFunction",
    "RangeSubselect",
    "RangeTableFunc",
    "RangeTableFuncCol",
    "RangeTableSample",
    "RangeVar",
    "RawStmt",
    "ResTarget",
    "RoleSpec",
    "RowExpr",
    "SortBy",
    "SQLValueFunction",
    "SubLink",
    "TableFunc",
    "TableLikeClause",
    "TableSampleClause",
    "TypeCast",
    "TypeName",
    "WindowClause",
    "WindowDef",
    "WithClause",
    "XmlExpr",
    "XmlSerialize",
    "Integer",
    "Float",
    "Boolean",
    "String",
    "BitString",
    "Null",
    "Alias",
    "ScalarArrayOpExpr",
    "SetToDefault",
    "FieldSelect",
    "FieldStore",
    "RelabelType",
    "CoerceViaIO",
    "ArrayCoerceExpr",
    "ConvertRowtypeExpr",
    "CollateExpr",
    "CollateClause",
    "CurrentOfStmt",
    "InlineCodeBlock",
    "MergeWhenClause",
    "MergeAction",
    "JsonObjectConstructor",
    "JsonArrayConstructor",
    "JsonArrayQueryConstructor",
    "JsonAggConstructor",
    "JsonOutput",
    "JsonKeyValue",
    "JsonParseExpr",
    "JsonScalarExpr",
    "JsonSerializeExpr",
    "JsonObjectAgg",
    "JsonArrayAgg",
    "StatsElem",
];

fn build_set(names: &[&'static str]) -> HashSet<&'static str> {
    names.iter().map(|s| *s).collect()
}

fn lowercased(names: &[&'static str]) -> HashSet<String> {
    names.iter().map(|s| s.to_ascii_lowercase()).collect()
}

/// Case-insensitive membership check against [`ATTRIBUTE_NAMES`].
pub fn is_attribute_name(ident: &str) -> bool {
    static SET: OnceLock<HashSet<String>> = OnceLock::new();
    let set = SET.get_or_init(|| lowercased(ATTRIBUTE_NAMES));
    set.contains(&ident.to_ascii_lowercase())
}

/// Case-insensitive membership check against [`NODE_TYPE_NAMES`].
pub fn is_node_type_name(ident: &str) -> bool {
    static SET: OnceLock<HashSet<String>> = OnceLock::new();
    let set = SET.get_or_init(|| lowercased(NODE_TYPE_NAMES));
    set.contains(&ident.to_ascii_lowercase())
}

/// Exposed mainly for tests and tooling that want the raw, original-case
/// registries (e.g. to report "closed set" sizes).
pub fn attribute_names() -> HashSet<&'static str> {
    build_set(ATTRIBUTE_NAMES)
}

pub fn node_type_names() -> HashSet<&'static str> {
    build_set(NODE_TYPE_NAMES)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("relname", true, false)]
    #[case("RelName", true, false)]
    #[case("SVAL", true, false)]
    #[case("SelectStmt", false, true)]
    #[case("selectstmt", false, true)]
    #[case("A_Const", false, true)]
    #[case("totally_made_up_field", false, false)]
    fn identifier_classifies_into_at_most_one_registry(
        #[case] ident: &str,
        #[case] expect_attribute: bool,
        #[case] expect_node_type: bool,
    ) {
        assert_eq!(is_attribute_name(ident), expect_attribute, "{ident}");
        assert_eq!(is_node_type_name(ident), expect_node_type, "{ident}");
    }

    #[test]
    fn known_attributes_recognized_case_insensitively() {
        assert!(is_attribute_name("relname"));
        assert!(is_attribute_name("RelName"));
        assert!(is_attribute_name("SVAL"));
    }

    #[test]
    fn unknown_identifier_is_neither() {
        assert!(!is_attribute_name("totally_made_up_field"));
        assert!(!is_node_type_name("totally_made_up_field"));
    }

    #[test]
    fn known_node_types_recognized_case_insensitively() {
        assert!(is_node_type_name("SelectStmt"));
        assert!(is_node_type_name("selectstmt"));
        assert!(is_node_type_name("A_Const"));
    }

    #[test]
    fn attribute_and_node_type_sets_are_disjoint_in_practice() {
        let attrs = attribute_names();
        let nodes = node_type_names();
        for a in &attrs {
            assert!(
                !nodes.iter().any(|n| n.eq_ignore_ascii_case(a)),
                "{a} present in both sets"
            );
        }
    }
}
