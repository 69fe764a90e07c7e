//! `CREATE TABLE` and its column/constraint sub-grammar. Inline column
//! constraints are lifted to table level during parsing so the table
//! carries one flat constraint list per kind.

use declsql_core::{
    CheckConstraint, Column, Deferrable, ExclusionConstraint, ExclusionElement, ForeignKey,
    ForeignKeyAction, GeneratedColumn, Ident, Identity, PrimaryKey, SchemaObject, SyntaxError,
    Table, UniqueConstraint,
};

use super::{ParsedStatement, Parser, TableConstraint};
use crate::keywords::Keyword;
use crate::token::TokenKind;

type ParseResult<T> = Result<T, SyntaxError>;

impl Parser<'_> {
    /// `CREATE TABLE` with the leading keywords already consumed.
    pub(super) fn parse_create_table(&mut self) -> ParseResult<ParsedStatement> {
        if self.eat_keyword(Keyword::IF) {
            self.expect_keyword(Keyword::NOT)?;
            self.expect_keyword(Keyword::EXISTS)?;
        }

        let name = self.parse_qualified_name()?;
        let mut table = Table::named("");
        table.name = name;

        self.expect_kind(TokenKind::LParen)?;
        if !self.eat_kind(TokenKind::RParen) {
            loop {
                self.parse_table_element(&mut table)?;
                if !self.eat_kind(TokenKind::Comma) {
                    break;
                }
            }
            self.expect_kind(TokenKind::RParen)?;
        }

        self.parse_table_suffix(&mut table)?;

        Ok(ParsedStatement::Object(SchemaObject::Table(table)))
    }

    fn parse_table_element(&mut self, table: &mut Table) -> ParseResult<()> {
        if self.check_keyword(Keyword::CONSTRAINT)
            || self.check_keyword(Keyword::PRIMARY)
            || self.check_keyword(Keyword::UNIQUE)
            || self.check_keyword(Keyword::FOREIGN)
            || self.check_keyword(Keyword::CHECK)
            || self.check_keyword(Keyword::EXCLUDE)
        {
            let constraint = self.parse_table_constraint()?;
            attach_table_constraint(table, constraint);
            return Ok(());
        }

        self.parse_column_def(table)
    }

    pub(super) fn parse_table_constraint(&mut self) -> ParseResult<TableConstraint> {
        let name = if self.eat_keyword(Keyword::CONSTRAINT) {
            Some(self.parse_ident()?)
        } else {
            None
        };

        if self.eat_keyword(Keyword::PRIMARY) {
            self.expect_keyword(Keyword::KEY)?;
            let columns = self.parse_paren_ident_list()?;
            return Ok(TableConstraint::PrimaryKey(PrimaryKey { name, columns }));
        }

        if self.eat_keyword(Keyword::UNIQUE) {
            // mysql spells `UNIQUE KEY name (cols)`.
            self.eat_keyword(Keyword::KEY);
            let columns = self.parse_paren_ident_list()?;
            let deferrable = self.parse_deferrable()?;
            return Ok(TableConstraint::Unique(UniqueConstraint {
                name,
                columns,
                deferrable,
            }));
        }

        if self.eat_keyword(Keyword::FOREIGN) {
            self.expect_keyword(Keyword::KEY)?;
            let columns = self.parse_paren_ident_list()?;
            let mut fk = self.parse_references_clause(columns)?;
            fk.name = name;
            return Ok(TableConstraint::ForeignKey(fk));
        }

        if self.eat_keyword(Keyword::CHECK) {
            self.expect_kind(TokenKind::LParen)?;
            let expr = self.parse_expr()?;
            self.expect_kind(TokenKind::RParen)?;
            let no_inherit = if self.eat_keyword(Keyword::NO) {
                self.expect_keyword(Keyword::INHERIT)?;
                true
            } else {
                false
            };
            return Ok(TableConstraint::Check(CheckConstraint {
                name,
                expr,
                no_inherit,
            }));
        }

        if self.eat_keyword(Keyword::EXCLUDE) {
            return self.parse_exclusion_constraint(name);
        }

        Err(self.error_here("expected a table constraint"))
    }

    /// `EXCLUDE [USING method] (element WITH operator, …) [WHERE (…)]`
    fn parse_exclusion_constraint(
        &mut self,
        name: Option<Ident>,
    ) -> ParseResult<TableConstraint> {
        let index_method = if self.eat_keyword(Keyword::USING) {
            self.parse_ident()?.value
        } else {
            "gist".to_string()
        };

        self.expect_kind(TokenKind::LParen)?;
        let mut elements = Vec::new();
        loop {
            let expr = self.parse_expr()?;
            self.expect_keyword(Keyword::WITH)?;
            let operator = self.parse_exclusion_operator()?;
            elements.push(ExclusionElement { expr, operator });
            if !self.eat_kind(TokenKind::Comma) {
                break;
            }
        }
        self.expect_kind(TokenKind::RParen)?;

        let where_clause = if self.eat_keyword(Keyword::WHERE) {
            self.expect_kind(TokenKind::LParen)?;
            let expr = self.parse_expr()?;
            self.expect_kind(TokenKind::RParen)?;
            Some(expr)
        } else {
            None
        };
        let deferrable = self.parse_deferrable()?;

        Ok(TableConstraint::Exclusion(ExclusionConstraint {
            name,
            index_method,
            elements,
            where_clause,
            deferrable,
        }))
    }

    fn parse_exclusion_operator(&mut self) -> ParseResult<String> {
        let token = self.advance();
        let operator = match token.kind {
            TokenKind::Eq
            | TokenKind::Neq
            | TokenKind::Lt
            | TokenKind::LtEq
            | TokenKind::Gt
            | TokenKind::GtEq
            | TokenKind::Ampersand
            | TokenKind::AmpAmp => token.text,
            _ => return Err(self.error_at(&token, "expected an exclusion operator")),
        };
        Ok(operator)
    }

    pub(super) fn parse_column_def(&mut self, table: &mut Table) -> ParseResult<()> {
        let name = self.parse_ident()?;
        let data_type = self.parse_data_type()?;
        let mut column = Column::new(name, data_type);

        loop {
            let constraint_name = if self.eat_keyword(Keyword::CONSTRAINT) {
                Some(self.parse_ident()?)
            } else {
                None
            };

            if self.eat_keyword(Keyword::NOT) {
                self.expect_keyword(Keyword::NULL)?;
                column.not_null = true;
                continue;
            }
            if self.eat_keyword(Keyword::NULL) {
                column.not_null = false;
                continue;
            }
            if self.eat_keyword(Keyword::DEFAULT) {
                column.default = Some(self.parse_expr()?);
                continue;
            }
            if self.eat_keyword(Keyword::PRIMARY) {
                self.expect_keyword(Keyword::KEY)?;
                table.primary_key = Some(PrimaryKey {
                    name: constraint_name,
                    columns: vec![column.name.clone()],
                });
                column.not_null = true;
                continue;
            }
            if self.eat_keyword(Keyword::UNIQUE) {
                self.eat_keyword(Keyword::KEY);
                let deferrable = self.parse_deferrable()?;
                table.uniques.push(UniqueConstraint {
                    name: constraint_name,
                    columns: vec![column.name.clone()],
                    deferrable,
                });
                continue;
            }
            if self.eat_keyword(Keyword::CHECK) {
                self.expect_kind(TokenKind::LParen)?;
                let expr = self.parse_expr()?;
                self.expect_kind(TokenKind::RParen)?;
                table.checks.push(CheckConstraint {
                    name: constraint_name,
                    expr,
                    no_inherit: false,
                });
                continue;
            }
            if self.eat_keyword(Keyword::REFERENCES) {
                let mut fk = self.parse_references_target(vec![column.name.clone()])?;
                fk.name = constraint_name;
                table.foreign_keys.push(fk);
                continue;
            }
            if self.eat_keyword(Keyword::COLLATE) {
                let collation = self.parse_qualified_name()?;
                column.collation = Some(match &collation.schema {
                    Some(schema) => format!("{}.{}", schema.value, collation.name.value),
                    None => collation.name.value.clone(),
                });
                continue;
            }
            if self.eat_keyword(Keyword::GENERATED) {
                self.parse_generated_clause(&mut column)?;
                continue;
            }
            // mysql shorthand for an identity-ish column.
            if self.eat_word("auto_increment") {
                column.identity = Some(Identity { always: false });
                continue;
            }
            if constraint_name.is_some() {
                return Err(self.error_here("expected a constraint after CONSTRAINT name"));
            }
            break;
        }

        if column.identity.is_some() {
            column.not_null = true;
        }
        table.columns.push(column);
        Ok(())
    }

    /// `GENERATED { ALWAYS | BY DEFAULT } AS { IDENTITY | ( expr ) [STORED] }`
    fn parse_generated_clause(&mut self, column: &mut Column) -> ParseResult<()> {
        let always = if self.eat_keyword(Keyword::ALWAYS) {
            true
        } else {
            self.expect_keyword(Keyword::BY)?;
            self.expect_keyword(Keyword::DEFAULT)?;
            false
        };
        self.expect_keyword(Keyword::AS)?;

        if self.eat_keyword(Keyword::IDENTITY) {
            // Sequence options in parentheses are accepted and dropped;
            // the catalog never reports them back for comparison.
            if self.eat_kind(TokenKind::LParen) {
                let _ = self.capture_balanced_text()?;
                self.expect_kind(TokenKind::RParen)?;
            }
            column.identity = Some(Identity { always });
            column.not_null = true;
            return Ok(());
        }

        self.expect_kind(TokenKind::LParen)?;
        let expr = self.parse_expr()?;
        self.expect_kind(TokenKind::RParen)?;
        let stored = self.eat_keyword(Keyword::STORED);
        column.generated = Some(GeneratedColumn { expr, stored });
        Ok(())
    }

    pub(super) fn parse_references_clause(
        &mut self,
        columns: Vec<Ident>,
    ) -> ParseResult<ForeignKey> {
        self.expect_keyword(Keyword::REFERENCES)?;
        self.parse_references_target(columns)
    }

    fn parse_references_target(&mut self, columns: Vec<Ident>) -> ParseResult<ForeignKey> {
        let referenced_table = self.parse_qualified_name()?;
        let referenced_columns = if self.peek_kind() == TokenKind::LParen {
            self.parse_paren_ident_list()?
        } else {
            columns.clone()
        };

        let mut fk = ForeignKey {
            name: None,
            columns,
            referenced_table,
            referenced_columns,
            on_delete: None,
            on_update: None,
            deferrable: None,
        };

        loop {
            if self.eat_keyword(Keyword::ON) {
                if self.eat_keyword(Keyword::DELETE) {
                    fk.on_delete = Some(self.parse_fk_action()?);
                } else {
                    self.expect_keyword(Keyword::UPDATE)?;
                    fk.on_update = Some(self.parse_fk_action()?);
                }
                continue;
            }
            if self.check_keyword(Keyword::DEFERRABLE)
                || self.check_keyword(Keyword::NOT)
                || self.check_keyword(Keyword::INITIALLY)
            {
                // `NOT` here could open `NOT DEFERRABLE` or a following
                // `NOT NULL` column option; only take the former.
                if self.check_keyword(Keyword::NOT)
                    && !self.peek_ahead(1).is_keyword(Keyword::DEFERRABLE)
                {
                    break;
                }
                fk.deferrable = self.parse_deferrable()?;
                continue;
            }
            break;
        }

        Ok(fk)
    }

    fn parse_fk_action(&mut self) -> ParseResult<ForeignKeyAction> {
        if self.eat_keyword(Keyword::CASCADE) {
            return Ok(ForeignKeyAction::Cascade);
        }
        if self.eat_keyword(Keyword::RESTRICT) {
            return Ok(ForeignKeyAction::Restrict);
        }
        if self.eat_keyword(Keyword::NO) {
            self.expect_keyword(Keyword::ACTION)?;
            return Ok(ForeignKeyAction::NoAction);
        }
        if self.eat_keyword(Keyword::SET) {
            if self.eat_keyword(Keyword::NULL) {
                return Ok(ForeignKeyAction::SetNull);
            }
            self.expect_keyword(Keyword::DEFAULT)?;
            return Ok(ForeignKeyAction::SetDefault);
        }
        Err(self.error_here("expected CASCADE, RESTRICT, NO ACTION, SET NULL, or SET DEFAULT"))
    }

    pub(super) fn parse_deferrable(&mut self) -> ParseResult<Option<Deferrable>> {
        if self.eat_keyword(Keyword::NOT) {
            self.expect_keyword(Keyword::DEFERRABLE)?;
            return Ok(Some(Deferrable::NotDeferrable));
        }
        if self.eat_keyword(Keyword::DEFERRABLE) {
            let initially_deferred = if self.eat_keyword(Keyword::INITIALLY) {
                if self.eat_keyword(Keyword::DEFERRED) {
                    true
                } else {
                    self.expect_keyword(Keyword::IMMEDIATE)?;
                    false
                }
            } else {
                false
            };
            return Ok(Some(Deferrable::Deferrable { initially_deferred }));
        }
        Ok(None)
    }

    /// Trailing table clauses after the element list. Unknown storage
    /// clauses are preserved as raw option strings.
    fn parse_table_suffix(&mut self, table: &mut Table) -> ParseResult<()> {
        loop {
            if self.eat_keyword(Keyword::PARTITION) {
                self.expect_keyword(Keyword::BY)?;
                let strategy = self.parse_ident()?.value.to_ascii_lowercase();
                self.expect_kind(TokenKind::LParen)?;
                let columns = self.capture_balanced_text()?;
                self.expect_kind(TokenKind::RParen)?;
                table
                    .options
                    .insert("partition_by".to_string(), format!("{strategy} ({columns})"));
                continue;
            }
            if self.eat_keyword(Keyword::USING) {
                let method = self.parse_ident()?.value;
                table.options.insert("access_method".to_string(), method);
                continue;
            }
            break;
        }
        Ok(())
    }
}

pub(crate) fn attach_table_constraint(table: &mut Table, constraint: TableConstraint) {
    match constraint {
        TableConstraint::PrimaryKey(pk) => {
            for pk_column in &pk.columns {
                if let Some(column) = table
                    .columns
                    .iter_mut()
                    .find(|column| column.name.key() == pk_column.key())
                {
                    column.not_null = true;
                }
            }
            table.primary_key = Some(pk);
        }
        TableConstraint::ForeignKey(fk) => table.foreign_keys.push(fk),
        TableConstraint::Unique(unique) => table.uniques.push(unique),
        TableConstraint::Check(check) => table.checks.push(check),
        TableConstraint::Exclusion(exclusion) => table.exclusions.push(exclusion),
    }
}
