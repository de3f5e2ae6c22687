use crate::alignment::diff::{diff, into_runs, Run};
use crate::types::{Alignment, Operation, Token};

/// Aligns two token sequences by text equality.
///
/// Substitution pairing is positional: a deleted run of length m followed by
/// an inserted run of length n yields `min(m, n)` substitutions pairing the
/// i-th deleted token with the i-th inserted token, then the excess as
/// deletions or insertions. Textual similarity plays no part.
pub fn align(reference: &[Token], hypothesis: &[Token]) -> Alignment {
    let ref_text: Vec<&str> = reference.iter().map(|t| t.text.as_str()).collect();
    let hyp_text: Vec<&str> = hypothesis.iter().map(|t| t.text.as_str()).collect();
    let runs = into_runs(&diff(&ref_text, &hyp_text));

    let mut operations = Vec::with_capacity(reference.len().max(hypothesis.len()));
    let mut pending_deleted: Option<Vec<usize>> = None;

    for run in runs {
        match run {
            Run::Equal(pairs) => {
                flush_deleted(&mut operations, pending_deleted.take(), reference);
                operations.extend(pairs.into_iter().map(|(r, h)| Operation::Correct {
                    reference: reference[r].clone(),
                    hypothesis: hypothesis[h].clone(),
                }));
            }
            Run::Deleted(indices) => {
                flush_deleted(&mut operations, pending_deleted.take(), reference);
                pending_deleted = Some(indices);
            }
            Run::Inserted(inserted) => {
                let deleted = pending_deleted.take().unwrap_or_default();
                pair_runs(&mut operations, &deleted, &inserted, reference, hypothesis);
            }
        }
    }
    flush_deleted(&mut operations, pending_deleted, reference);

    tracing::debug!(
        reference_len = reference.len(),
        hypothesis_len = hypothesis.len(),
        operations = operations.len(),
        "alignment: operations built"
    );
    Alignment::new(operations)
}

fn pair_runs(
    operations: &mut Vec<Operation>,
    deleted: &[usize],
    inserted: &[usize],
    reference: &[Token],
    hypothesis: &[Token],
) {
    let paired = deleted.len().min(inserted.len());
    for (&r, &h) in deleted.iter().zip(inserted.iter()) {
        operations.push(Operation::Substitution {
            reference: reference[r].clone(),
            hypothesis: hypothesis[h].clone(),
            critical: false,
        });
    }
    operations.extend(deleted[paired..].iter().map(|&r| Operation::Deletion {
        reference: reference[r].clone(),
    }));
    operations.extend(inserted[paired..].iter().map(|&h| Operation::Insertion {
        hypothesis: hypothesis[h].clone(),
    }));
}

fn flush_deleted(
    operations: &mut Vec<Operation>,
    deleted: Option<Vec<usize>>,
    reference: &[Token],
) {
    if let Some(deleted) = deleted {
        operations.extend(deleted.into_iter().map(|r| Operation::Deletion {
            reference: reference[r].clone(),
        }));
    }
}
