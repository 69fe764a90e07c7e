//! The keyword table: one case-insensitive map from word to keyword id.
//! Keywords the grammar does not use yet are still listed (and reserved
//! where the dialect reserves them) so identifiers cannot collide with
//! future grammar.

macro_rules! define_keywords {
    ($($keyword:ident),* $(,)?) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
        #[allow(non_camel_case_types)]
        pub enum Keyword {
            $($keyword),*
        }

        /// Sorted uppercase spellings, index-aligned with [`ALL_KEYWORDS`].
        const ALL_KEYWORD_NAMES: &[&str] = &[
            $(stringify!($keyword)),*
        ];

        const ALL_KEYWORDS: &[Keyword] = &[
            $(Keyword::$keyword),*
        ];
    };
}

// Must stay in ASCII-alphabetical order: lookup is a binary search.
define_keywords!(
    ACTION,
    ADD,
    AFTER,
    ALL,
    ALTER,
    ALWAYS,
    AND,
    ANY,
    ARRAY,
    AS,
    ASC,
    BEFORE,
    BETWEEN,
    BIGINT,
    BIGSERIAL,
    BIT,
    BOOLEAN,
    BOTH,
    BY,
    BYTEA,
    CACHE,
    CASCADE,
    CASCADED,
    CASE,
    CAST,
    CHAR,
    CHARACTER,
    CHECK,
    COLLATE,
    COLUMN,
    COMMENT,
    CONCURRENTLY,
    CONSTRAINT,
    CREATE,
    CROSS,
    CURRENT_DATE,
    CURRENT_TIME,
    CURRENT_TIMESTAMP,
    CURRENT_USER,
    DATA,
    DATE,
    DECIMAL,
    DEFAULT,
    DEFERRABLE,
    DEFERRED,
    DELETE,
    DESC,
    DISTINCT,
    DO,
    DOMAIN,
    DOUBLE,
    DROP,
    ELSE,
    END,
    ENUM,
    EXCLUDE,
    EXISTS,
    EXTENSION,
    FALSE,
    FIRST,
    FLOAT,
    FOR,
    FOREIGN,
    FROM,
    FULL,
    GENERATED,
    GRANT,
    GROUP,
    HASH,
    IDENTITY,
    IF,
    ILIKE,
    IMMEDIATE,
    IN,
    INCLUDE,
    INCREMENT,
    INDEX,
    INHERIT,
    INITIALLY,
    INNER,
    INSERT,
    INT,
    INT2,
    INT4,
    INT8,
    INTEGER,
    INTERVAL,
    INTO,
    IS,
    JOIN,
    JSON,
    JSONB,
    KEY,
    LAST,
    LEADING,
    LEFT,
    LIKE,
    LIMIT,
    LIST,
    LOCAL,
    MATERIALIZED,
    MAXVALUE,
    MINVALUE,
    NATURAL,
    NO,
    NOT,
    NULL,
    NULLS,
    NUMERIC,
    OFFSET,
    ON,
    ONLY,
    OPTION,
    OR,
    ORDER,
    OUTER,
    OWNED,
    OWNER,
    PARTITION,
    PERMISSIVE,
    POLICY,
    PRECISION,
    PRIMARY,
    PRIVILEGES,
    PUBLIC,
    RANGE,
    REAL,
    REFERENCES,
    RENAME,
    REPLACE,
    RESTRICT,
    RESTRICTIVE,
    REVOKE,
    RIGHT,
    ROW,
    ROWS,
    SCHEMA,
    SELECT,
    SEQUENCE,
    SERIAL,
    SESSION_USER,
    SET,
    SMALLINT,
    SMALLSERIAL,
    SOME,
    START,
    STORED,
    TABLE,
    TEMPORARY,
    TEXT,
    THEN,
    TIME,
    TIMESTAMP,
    TIMESTAMPTZ,
    TO,
    TRAILING,
    TRIGGER,
    TRUE,
    TRUNCATE,
    TYPE,
    UNION,
    UNIQUE,
    UNKNOWN,
    UNSIGNED,
    UPDATE,
    USAGE,
    USING,
    UUID,
    VALUE,
    VALUES,
    VARCHAR,
    VARYING,
    VIEW,
    WHEN,
    WHERE,
    WITH,
    WITHOUT,
    ZEROFILL,
    ZONE,
);

impl Keyword {
    /// Case-insensitive lookup.
    #[must_use]
    pub fn lookup(word: &str) -> Option<Keyword> {
        let upper = word.to_ascii_uppercase();
        ALL_KEYWORD_NAMES
            .binary_search(&upper.as_str())
            .ok()
            .map(|index| ALL_KEYWORDS[index])
    }

    /// Reserved words cannot be used as bare identifiers in any mode.
    #[must_use]
    pub fn is_reserved(self) -> bool {
        use Keyword::*;
        matches!(
            self,
            ALL | AND
                | ANY
                | ARRAY
                | AS
                | ASC
                | BETWEEN
                | BOTH
                | CASE
                | CAST
                | CHECK
                | COLLATE
                | COLUMN
                | CONSTRAINT
                | CREATE
                | CROSS
                | CURRENT_DATE
                | CURRENT_TIME
                | CURRENT_TIMESTAMP
                | CURRENT_USER
                | DEFAULT
                | DEFERRABLE
                | DESC
                | DISTINCT
                | DO
                | ELSE
                | END
                | EXISTS
                | FALSE
                | FOR
                | FOREIGN
                | FROM
                | FULL
                | GRANT
                | GROUP
                | IN
                | INITIALLY
                | INNER
                | INTO
                | IS
                | JOIN
                | LEADING
                | LEFT
                | LIKE
                | LIMIT
                | NATURAL
                | NOT
                | NULL
                | OFFSET
                | ON
                | ONLY
                | OR
                | ORDER
                | OUTER
                | PRIMARY
                | REFERENCES
                | RIGHT
                | SELECT
                | SESSION_USER
                | SOME
                | TABLE
                | THEN
                | TO
                | TRAILING
                | TRUE
                | UNION
                | UNIQUE
                | USING
                | WHEN
                | WHERE
                | WITH
        )
    }
}
