//! The non-table statements: indexes, views, policies, enum types,
//! schemas, extensions, privileges, comments, and `ALTER TABLE`.

use declsql_core::{
    Comment, CommentTarget, Extension, Ident, IndexColumn, IndexDef, MaterializedView, NullsOrder,
    Policy, PolicyCommand, Privilege, PrivilegeObject, PrivilegeOp, SchemaDef, SchemaObject,
    SortOrder, SyntaxError, TypeDef, View,
};

use super::{AlterTableAction, ParsedStatement, Parser};
use crate::keywords::Keyword;
use crate::token::TokenKind;

type ParseResult<T> = Result<T, SyntaxError>;

impl Parser<'_> {
    /// `CREATE [UNIQUE] INDEX [CONCURRENTLY] [name] ON table …`
    pub(super) fn parse_create_index(&mut self) -> ParseResult<ParsedStatement> {
        let unique = self.eat_keyword(Keyword::UNIQUE);
        self.expect_keyword(Keyword::INDEX)?;
        let concurrent = self.eat_keyword(Keyword::CONCURRENTLY);

        if self.eat_keyword(Keyword::IF) {
            self.expect_keyword(Keyword::NOT)?;
            self.expect_keyword(Keyword::EXISTS)?;
        }

        let name = if self.check_keyword(Keyword::ON) {
            None
        } else {
            Some(self.parse_ident()?)
        };
        self.expect_keyword(Keyword::ON)?;
        self.eat_keyword(Keyword::ONLY);
        let table = self.parse_qualified_name()?;

        let method = if self.eat_keyword(Keyword::USING) {
            Some(self.parse_ident()?.value.to_ascii_lowercase())
        } else {
            None
        };

        self.expect_kind(TokenKind::LParen)?;
        let mut columns = vec![self.parse_index_column()?];
        while self.eat_kind(TokenKind::Comma) {
            columns.push(self.parse_index_column()?);
        }
        self.expect_kind(TokenKind::RParen)?;

        let include = if self.eat_keyword(Keyword::INCLUDE) {
            self.parse_paren_ident_list()?
        } else {
            Vec::new()
        };

        let where_clause = if self.eat_keyword(Keyword::WHERE) {
            Some(self.parse_expr()?)
        } else {
            None
        };

        // A nameless index gets the postgres default so the differ can
        // always pair by name.
        let name = name.or_else(|| default_index_name(&table, &columns));
        let Some(name) = name else {
            return Err(self.error_here("index on an expression requires an explicit name"));
        };

        Ok(ParsedStatement::Object(SchemaObject::Index(IndexDef {
            name: Some(name),
            table,
            columns,
            unique,
            method,
            where_clause,
            include,
            concurrent,
        })))
    }

    fn parse_index_column(&mut self) -> ParseResult<IndexColumn> {
        let expr = self.parse_expr()?;

        let order = if self.eat_keyword(Keyword::ASC) {
            Some(SortOrder::Asc)
        } else if self.eat_keyword(Keyword::DESC) {
            Some(SortOrder::Desc)
        } else {
            None
        };

        let nulls = if self.eat_keyword(Keyword::NULLS) {
            if self.eat_keyword(Keyword::FIRST) {
                Some(NullsOrder::First)
            } else {
                self.expect_keyword(Keyword::LAST)?;
                Some(NullsOrder::Last)
            }
        } else {
            None
        };

        Ok(IndexColumn { expr, order, nulls })
    }

    /// `CREATE VIEW name [(cols)] AS select`
    pub(super) fn parse_create_view(&mut self) -> ParseResult<ParsedStatement> {
        let name = self.parse_qualified_name()?;

        let columns = if self.peek_kind() == TokenKind::LParen {
            self.parse_paren_ident_list()?
        } else {
            Vec::new()
        };

        self.expect_keyword(Keyword::AS)?;
        let query = self.capture_statement_tail()?;
        if query.is_empty() {
            return Err(self.error_here("view definition must not be empty"));
        }

        Ok(ParsedStatement::Object(SchemaObject::View(View {
            name,
            columns,
            query,
        })))
    }

    /// `CREATE MATERIALIZED VIEW name AS select [WITH [NO] DATA]`
    pub(super) fn parse_create_materialized_view(&mut self) -> ParseResult<ParsedStatement> {
        if self.eat_keyword(Keyword::IF) {
            self.expect_keyword(Keyword::NOT)?;
            self.expect_keyword(Keyword::EXISTS)?;
        }
        let name = self.parse_qualified_name()?;
        self.expect_keyword(Keyword::AS)?;

        let query = self.capture_statement_tail()?;
        if query.is_empty() {
            return Err(self.error_here("materialized view definition must not be empty"));
        }

        // The lexer marks this WITH specially, so there is no ambiguity
        // with a CTE inside the captured query.
        let with_data = if self.eat_kind(TokenKind::WithBeforeData) {
            if self.eat_keyword(Keyword::NO) {
                self.expect_keyword(Keyword::DATA)?;
                false
            } else {
                self.expect_keyword(Keyword::DATA)?;
                true
            }
        } else {
            true
        };

        Ok(ParsedStatement::Object(SchemaObject::MaterializedView(
            MaterializedView {
                name,
                query,
                with_data,
            },
        )))
    }

    /// `CREATE POLICY name ON table [AS …] [FOR …] [TO …] [USING (…)]
    /// [WITH CHECK (…)]`
    pub(super) fn parse_create_policy(&mut self) -> ParseResult<ParsedStatement> {
        let name = self.parse_ident()?;
        self.expect_keyword(Keyword::ON)?;
        let table = self.parse_qualified_name()?;

        let mut permissive = true;
        if self.eat_keyword(Keyword::AS) {
            if self.eat_keyword(Keyword::PERMISSIVE) {
                permissive = true;
            } else {
                self.expect_keyword(Keyword::RESTRICTIVE)?;
                permissive = false;
            }
        }

        let command = if self.eat_keyword(Keyword::FOR) {
            Some(self.parse_policy_command()?)
        } else {
            None
        };

        // `TO PUBLIC` and an absent role list mean the same thing; both
        // normalize to the empty list.
        let mut roles = Vec::new();
        if self.eat_keyword(Keyword::TO) {
            loop {
                if !self.eat_keyword(Keyword::PUBLIC) {
                    roles.push(self.parse_ident()?);
                }
                if !self.eat_kind(TokenKind::Comma) {
                    break;
                }
            }
        }

        let using_expr = if self.eat_keyword(Keyword::USING) {
            self.expect_kind(TokenKind::LParen)?;
            let expr = self.parse_expr()?;
            self.expect_kind(TokenKind::RParen)?;
            Some(expr)
        } else {
            None
        };

        let check_expr = if self.eat_keyword(Keyword::WITH) {
            self.expect_keyword(Keyword::CHECK)?;
            self.expect_kind(TokenKind::LParen)?;
            let expr = self.parse_expr()?;
            self.expect_kind(TokenKind::RParen)?;
            Some(expr)
        } else {
            None
        };

        Ok(ParsedStatement::Object(SchemaObject::Policy(Policy {
            name,
            table,
            permissive,
            command,
            roles,
            using_expr,
            check_expr,
        })))
    }

    fn parse_policy_command(&mut self) -> ParseResult<PolicyCommand> {
        if self.eat_keyword(Keyword::ALL) {
            return Ok(PolicyCommand::All);
        }
        if self.eat_keyword(Keyword::SELECT) {
            return Ok(PolicyCommand::Select);
        }
        if self.eat_keyword(Keyword::INSERT) {
            return Ok(PolicyCommand::Insert);
        }
        if self.eat_keyword(Keyword::UPDATE) {
            return Ok(PolicyCommand::Update);
        }
        if self.eat_keyword(Keyword::DELETE) {
            return Ok(PolicyCommand::Delete);
        }
        Err(self.error_here("expected ALL, SELECT, INSERT, UPDATE, or DELETE"))
    }

    fn parse_policy_role(&mut self) -> ParseResult<Ident> {
        if self.eat_keyword(Keyword::PUBLIC) {
            return Ok(Ident::unquoted("PUBLIC"));
        }
        self.parse_ident()
    }

    /// `CREATE TYPE name AS ENUM ('a', 'b', …)`
    pub(super) fn parse_create_type(&mut self) -> ParseResult<ParsedStatement> {
        let name = self.parse_qualified_name()?;
        self.expect_keyword(Keyword::AS)?;
        self.expect_keyword(Keyword::ENUM)?;
        self.expect_kind(TokenKind::LParen)?;

        let mut labels = Vec::new();
        if self.peek_kind() != TokenKind::RParen {
            labels.push(self.parse_string()?);
            while self.eat_kind(TokenKind::Comma) {
                labels.push(self.parse_string()?);
            }
        }
        self.expect_kind(TokenKind::RParen)?;

        Ok(ParsedStatement::Object(SchemaObject::Type(TypeDef {
            name,
            labels,
        })))
    }

    pub(super) fn parse_create_schema(&mut self) -> ParseResult<ParsedStatement> {
        if self.eat_keyword(Keyword::IF) {
            self.expect_keyword(Keyword::NOT)?;
            self.expect_keyword(Keyword::EXISTS)?;
        }
        let name = self.parse_ident()?;
        Ok(ParsedStatement::Object(SchemaObject::Schema(SchemaDef {
            name,
        })))
    }

    /// `CREATE EXTENSION [IF NOT EXISTS] name [WITH] [SCHEMA s] [VERSION v]`
    pub(super) fn parse_create_extension(&mut self) -> ParseResult<ParsedStatement> {
        if self.eat_keyword(Keyword::IF) {
            self.expect_keyword(Keyword::NOT)?;
            self.expect_keyword(Keyword::EXISTS)?;
        }
        let name = self.parse_ident()?;

        self.eat_keyword(Keyword::WITH);
        let mut schema = None;
        let mut version = None;
        loop {
            if self.eat_keyword(Keyword::SCHEMA) {
                schema = Some(self.parse_ident()?);
                continue;
            }
            if self.eat_word("version") {
                version = Some(self.parse_string()?);
                continue;
            }
            break;
        }

        Ok(ParsedStatement::Object(SchemaObject::Extension(
            Extension {
                name,
                schema,
                version,
            },
        )))
    }

    /// `ALTER TABLE [ONLY] name ADD …` (the reconciliation subset).
    pub(super) fn parse_alter_table(&mut self) -> ParseResult<ParsedStatement> {
        self.expect_keyword(Keyword::TABLE)?;
        self.eat_keyword(Keyword::ONLY);
        let table = self.parse_qualified_name()?;

        self.expect_keyword(Keyword::ADD)?;

        if self.eat_keyword(Keyword::COLUMN) {
            let mut scratch = declsql_core::Table::named("");
            self.parse_column_def(&mut scratch)?;
            let column = scratch
                .columns
                .pop()
                .ok_or_else(|| self.error_here("expected a column definition"))?;
            return Ok(ParsedStatement::AlterTable {
                table,
                action: AlterTableAction::AddColumn(column),
            });
        }

        let constraint = self.parse_table_constraint()?;
        Ok(ParsedStatement::AlterTable {
            table,
            action: AlterTableAction::AddConstraint(constraint),
        })
    }

    /// `GRANT ops ON [TABLE] name TO role [WITH GRANT OPTION]`
    pub(super) fn parse_grant(&mut self) -> ParseResult<ParsedStatement> {
        let operations = self.parse_privilege_ops()?;
        self.expect_keyword(Keyword::ON)?;
        let on = self.parse_privilege_object()?;
        self.expect_keyword(Keyword::TO)?;
        let grantee = self.parse_policy_role()?;

        let with_grant_option = if self.eat_keyword(Keyword::WITH) {
            self.expect_keyword(Keyword::GRANT)?;
            self.expect_keyword(Keyword::OPTION)?;
            true
        } else {
            false
        };

        Ok(ParsedStatement::Object(SchemaObject::Privilege(Privilege {
            operations,
            on,
            grantee,
            with_grant_option,
        })))
    }

    /// A declarative schema states what is granted; a REVOKE in the input
    /// is rejected rather than silently inverted.
    pub(super) fn parse_revoke(&mut self) -> ParseResult<ParsedStatement> {
        Err(self.error_here(
            "REVOKE is not declarative; describe the desired grants with GRANT statements",
        ))
    }

    fn parse_privilege_ops(&mut self) -> ParseResult<Vec<PrivilegeOp>> {
        if self.eat_keyword(Keyword::ALL) {
            self.eat_keyword(Keyword::PRIVILEGES);
            return Ok(vec![PrivilegeOp::All]);
        }

        let mut operations = vec![self.parse_privilege_op()?];
        while self.eat_kind(TokenKind::Comma) {
            operations.push(self.parse_privilege_op()?);
        }
        Ok(operations)
    }

    fn parse_privilege_op(&mut self) -> ParseResult<PrivilegeOp> {
        if self.eat_keyword(Keyword::SELECT) {
            return Ok(PrivilegeOp::Select);
        }
        if self.eat_keyword(Keyword::INSERT) {
            return Ok(PrivilegeOp::Insert);
        }
        if self.eat_keyword(Keyword::UPDATE) {
            return Ok(PrivilegeOp::Update);
        }
        if self.eat_keyword(Keyword::DELETE) {
            return Ok(PrivilegeOp::Delete);
        }
        if self.eat_keyword(Keyword::TRUNCATE) {
            return Ok(PrivilegeOp::Truncate);
        }
        if self.eat_keyword(Keyword::REFERENCES) {
            return Ok(PrivilegeOp::References);
        }
        if self.eat_keyword(Keyword::TRIGGER) {
            return Ok(PrivilegeOp::Trigger);
        }
        if self.eat_keyword(Keyword::USAGE) {
            return Ok(PrivilegeOp::Usage);
        }
        if self.eat_keyword(Keyword::CREATE) {
            return Ok(PrivilegeOp::Create);
        }
        Err(self.error_here("expected a privilege name"))
    }

    fn parse_privilege_object(&mut self) -> ParseResult<PrivilegeObject> {
        if self.eat_keyword(Keyword::SCHEMA) {
            return Ok(PrivilegeObject::Schema(self.parse_ident()?));
        }
        self.eat_keyword(Keyword::TABLE);
        Ok(PrivilegeObject::Table(self.parse_qualified_name()?))
    }

    /// `COMMENT ON target IS {'text' | NULL}`
    pub(super) fn parse_comment(&mut self) -> ParseResult<ParsedStatement> {
        self.expect_keyword(Keyword::ON)?;
        let target = self.parse_comment_target()?;
        self.expect_keyword(Keyword::IS)?;

        let text = if self.eat_keyword(Keyword::NULL) {
            None
        } else {
            Some(self.parse_string()?)
        };

        Ok(ParsedStatement::Object(SchemaObject::Comment(Comment {
            target,
            text,
        })))
    }

    fn parse_comment_target(&mut self) -> ParseResult<CommentTarget> {
        if self.eat_keyword(Keyword::TABLE) {
            return Ok(CommentTarget::Table(self.parse_qualified_name()?));
        }
        if self.eat_keyword(Keyword::COLUMN) {
            let path = self.parse_comment_column_path()?;
            return Ok(path);
        }
        if self.eat_keyword(Keyword::INDEX) {
            return Ok(CommentTarget::Index(self.parse_qualified_name()?));
        }
        if self.eat_keyword(Keyword::MATERIALIZED) {
            self.expect_keyword(Keyword::VIEW)?;
            return Ok(CommentTarget::MaterializedView(
                self.parse_qualified_name()?,
            ));
        }
        if self.eat_keyword(Keyword::VIEW) {
            return Ok(CommentTarget::View(self.parse_qualified_name()?));
        }
        if self.eat_keyword(Keyword::TYPE) {
            return Ok(CommentTarget::Type(self.parse_qualified_name()?));
        }
        if self.eat_keyword(Keyword::EXTENSION) {
            return Ok(CommentTarget::Extension(self.parse_ident()?));
        }
        if self.eat_keyword(Keyword::SCHEMA) {
            return Ok(CommentTarget::Schema(self.parse_ident()?));
        }
        Err(self.error_here("unsupported COMMENT target"))
    }

    /// `schema.table.column` or `table.column`.
    fn parse_comment_column_path(&mut self) -> ParseResult<CommentTarget> {
        let first = self.parse_ident()?;
        self.expect_kind(TokenKind::Dot)?;
        let second = self.parse_ident()?;

        if self.eat_kind(TokenKind::Dot) {
            let third = self.parse_ident()?;
            return Ok(CommentTarget::Column {
                table: declsql_core::QualifiedName {
                    schema: Some(first),
                    name: second,
                },
                column: third,
            });
        }

        Ok(CommentTarget::Column {
            table: declsql_core::QualifiedName {
                schema: None,
                name: first,
            },
            column: second,
        })
    }
}

fn default_index_name(
    table: &declsql_core::QualifiedName,
    columns: &[IndexColumn],
) -> Option<Ident> {
    let mut parts = vec![table.name.value.clone()];
    for column in columns {
        match &column.expr {
            declsql_core::Expr::Ident(ident) => parts.push(ident.value.clone()),
            _ => return None,
        }
    }
    parts.push("idx".to_string());
    Some(Ident::unquoted(parts.join("_")))
}
