//! Query resolution: keyword or raw Cypher → bounded statement + parameters.

use vehigraph_core::{Parameters, QueryRequest, RelationshipKeyword};

use crate::client::GraphError;

/// Parameter name the client reserves for the result limit.
pub const LIMIT_PARAM: &str = "__limit";

/// Clauses a raw query may start with. Only reading queries are passed through.
const READ_CLAUSES: &[&str] = &["MATCH", "OPTIONAL", "WITH", "UNWIND", "CALL", "RETURN"];

/// A statement ready to hand to a transport.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedQuery {
    pub statement: String,
    /// Caller parameters plus the reserved limit.
    pub parameters: Parameters,
    /// Set when the statement came from a keyword template.
    pub keyword: Option<RelationshipKeyword>,
}

/// Canonical statement for a relationship keyword.
///
/// Each template projects properties rather than returning the path itself so
/// both transports produce the same record shape.
pub fn template(keyword: RelationshipKeyword) -> &'static str {
    match keyword {
        RelationshipKeyword::LivesWith => {
            "MATCH (a)-[r:LIVES_WITH]->(b) \
             RETURN properties(a) AS source, type(r) AS relationship, \
             properties(r) AS relationship_properties, properties(b) AS target \
             LIMIT $__limit"
        }
        RelationshipKeyword::Drives => {
            "MATCH (a)-[r:DRIVES]->(b) \
             RETURN properties(a) AS source, type(r) AS relationship, \
             properties(r) AS relationship_properties, properties(b) AS target \
             LIMIT $__limit"
        }
        RelationshipKeyword::Owns => {
            "MATCH (a)-[r:OWNS]->(b) \
             RETURN properties(a) AS source, type(r) AS relationship, \
             properties(r) AS relationship_properties, properties(b) AS target \
             LIMIT $__limit"
        }
    }
}

/// Resolve a request into the statement and parameters sent to Neo4j.
///
/// Performs no I/O; every rejection happens here, before a transport is touched.
pub fn resolve(request: &QueryRequest) -> Result<ResolvedQuery, GraphError> {
    if request.limit == 0 {
        return Err(GraphError::InvalidLimit);
    }

    let (statement, keyword) = match request.query.parse::<RelationshipKeyword>() {
        Ok(keyword) => (template(keyword).to_string(), Some(keyword)),
        Err(_) => {
            if !is_read_query(&request.query) {
                return Err(GraphError::UnrecognizedQuery(request.query.clone()));
            }
            (with_limit_clause(&request.query), None)
        }
    };

    if request.parameters.contains_key(LIMIT_PARAM) {
        return Err(GraphError::ParameterConflict(LIMIT_PARAM.to_string()));
    }
    let mut parameters = request.parameters.clone();
    parameters.insert(LIMIT_PARAM.to_string(), request.limit.into());

    Ok(ResolvedQuery {
        statement,
        parameters,
        keyword,
    })
}

/// True when the statement starts with a reading clause and contains no
/// clause that writes to the graph.
pub fn is_read_query(statement: &str) -> bool {
    let tokens = tokenize(statement);
    let starts_with_read = match tokens.first() {
        Some(Token::Word(first)) => READ_CLAUSES.iter().any(|c| first.eq_ignore_ascii_case(c)),
        _ => false,
    };
    starts_with_read
        && !clause_words(&tokens)
            .into_iter()
            .any(|(_, w)| is_write_clause(w))
}

/// True when the statement already has a `LIMIT` clause.
///
/// Only a `LIMIT` keyword followed by an integer or a parameter counts;
/// property names, labels and text inside literals are ignored.
pub fn has_limit_clause(statement: &str) -> bool {
    let tokens = tokenize(statement);
    clause_words(&tokens).into_iter().any(|(i, w)| {
        w.eq_ignore_ascii_case("LIMIT")
            && matches!(tokens.get(i + 1), Some(Token::Number | Token::Param))
    })
}

/// Append `LIMIT $__limit` unless the statement is already bounded.
pub fn with_limit_clause(statement: &str) -> String {
    let trimmed = statement.trim().trim_end_matches(';').trim_end();
    if has_limit_clause(trimmed) {
        trimmed.to_string()
    } else {
        format!("{trimmed} LIMIT ${LIMIT_PARAM}")
    }
}

// ── Lexing ──────────────────────────────────────────────────────────

const WRITE_CLAUSES: &[&str] = &[
    "CREATE", "MERGE", "DELETE", "DETACH", "SET", "REMOVE", "DROP", "FOREACH",
];

fn is_write_clause(word: &str) -> bool {
    WRITE_CLAUSES.iter().any(|c| word.eq_ignore_ascii_case(c))
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token<'a> {
    Word(&'a str),
    Number,
    Param,
    /// String literal or backquoted name.
    Quoted,
    Symbol(char),
}

/// Words that sit in clause position: not a property (`n.limit`), a label or
/// relationship type (`:Set`), or a map key (`{limit: 1}`).
fn clause_words<'a>(tokens: &[Token<'a>]) -> Vec<(usize, &'a str)> {
    tokens
        .iter()
        .enumerate()
        .filter_map(|(i, token)| {
            let Token::Word(word) = *token else {
                return None;
            };
            let after_accessor = i > 0 && matches!(tokens[i - 1], Token::Symbol('.' | ':'));
            let map_key = matches!(tokens.get(i + 1), Some(Token::Symbol(':')));
            (!after_accessor && !map_key).then_some((i, word))
        })
        .collect()
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn tokenize(s: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut chars = s.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        match c {
            c if c.is_whitespace() => {}
            '\'' | '"' | '`' => {
                let mut escaped = false;
                for (_, next) in chars.by_ref() {
                    if escaped {
                        escaped = false;
                    } else if next == '\\' && c != '`' {
                        escaped = true;
                    } else if next == c {
                        break;
                    }
                }
                tokens.push(Token::Quoted);
            }
            '/' if matches!(chars.peek(), Some((_, '/'))) => {
                for (_, next) in chars.by_ref() {
                    if next == '\n' {
                        break;
                    }
                }
            }
            '/' if matches!(chars.peek(), Some((_, '*'))) => {
                chars.next();
                let mut star = false;
                for (_, next) in chars.by_ref() {
                    if star && next == '/' {
                        break;
                    }
                    star = next == '*';
                }
            }
            '$' => {
                while chars.next_if(|&(_, n)| is_word_char(n)).is_some() {}
                tokens.push(Token::Param);
            }
            c if c.is_ascii_digit() => {
                while chars.next_if(|&(_, n)| is_word_char(n)).is_some() {}
                tokens.push(Token::Number);
            }
            c if is_word_char(c) => {
                while chars.next_if(|&(_, n)| is_word_char(n)).is_some() {}
                let end = chars.peek().map_or(s.len(), |&(i, _)| i);
                tokens.push(Token::Word(&s[start..end]));
            }
            other => tokens.push(Token::Symbol(other)),
        }
    }
    tokens
}
