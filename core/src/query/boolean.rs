use super::{intersect, union, DocSet};
use crate::index::{DocumentCollection, InvertedIndex};
use crate::tokenizer::Normalizer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOp {
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BooleanToken {
    Op(BoolOp),
    Not,
    Operand(String),
}

/// Split on whitespace; `and`, `or` and `not` are keywords in any case.
pub fn parse_boolean(query: &str) -> Vec<BooleanToken> {
    query
        .split_whitespace()
        .map(|tok| match tok.to_ascii_lowercase().as_str() {
            "and" => BooleanToken::Op(BoolOp::And),
            "or" => BooleanToken::Op(BoolOp::Or),
            "not" => BooleanToken::Not,
            _ => BooleanToken::Operand(tok.to_string()),
        })
        .collect()
}

/// Left fold over the query with no precedence and no grouping.
///
/// The first operand seeds the result; each later operand is combined with the
/// most recent operator (AND when none was given). `NOT` negates only the next
/// operand, against the whole collection; repeating it does not cancel it. Operands that normalize to nothing
/// (stopwords, punctuation) are skipped without consuming a pending `NOT`.
pub fn evaluate_boolean(
    query: &str,
    normalizer: &dyn Normalizer,
    index: &InvertedIndex,
    documents: &DocumentCollection,
) -> DocSet {
    let mut result: Option<DocSet> = None;
    let mut op = BoolOp::And;
    let mut negate = false;

    for token in parse_boolean(query) {
        match token {
            BooleanToken::Op(next) => op = next,
            BooleanToken::Not => negate = true,
            BooleanToken::Operand(raw) => {
                let Some(term) = normalizer.normalize(&raw).into_iter().next() else {
                    continue;
                };
                let mut docs = index.documents(&term);
                if negate {
                    docs = documents.complement(&docs);
                    negate = false;
                }
                result = Some(match result {
                    None => docs,
                    Some(acc) => match op {
                        BoolOp::And => intersect(&acc, &docs),
                        BoolOp::Or => union(&acc, &docs),
                    },
                });
            }
        }
    }
    result.unwrap_or_default()
}
