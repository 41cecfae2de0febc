use super::content::shelved_contents_equal;
use super::error::{CompareError, CompareResult};
use super::matching::{correspond, ChangeIdentity};
use super::result::{summary_message, ComparisonEntry, DiffResult, SAME_SHELVESET_MESSAGE};
use crate::vcs::{PendingChange, Shelveset, VersionControl};
use std::collections::BTreeMap;

/// Compare the pending changes of two shelvesets.
///
/// Fails with [`CompareError::InvalidArgument`] when either side is missing.
/// Identical shelvesets (same name and owner) are reported as all matching
/// without downloading any content.
pub fn compare<B: VersionControl + ?Sized>(
    backend: &B,
    first: Option<&Shelveset>,
    second: Option<&Shelveset>,
) -> CompareResult<DiffResult> {
    let first = first.ok_or(CompareError::InvalidArgument("first shelveset"))?;
    let second = second.ok_or(CompareError::InvalidArgument("second shelveset"))?;

    let first_changes = backend.query_shelved_changes(first)?;
    let second_changes = backend.query_shelved_changes(second)?;
    tracing::info!(
        first = %first.qualified_name(),
        second = %second.qualified_name(),
        first_changes = first_changes.len(),
        second_changes = second_changes.len(),
        "comparing shelvesets"
    );

    let same_shelveset = first.is_same_as(second);
    let correspondence = correspond(&first_changes, &second_changes);

    let mut ordered: BTreeMap<String, ComparisonEntry> = BTreeMap::new();
    let mut common = 0;
    let mut same_content = 0;

    for pairing in &correspondence.pairs {
        let change = &first_changes[pairing.first];
        let key = change.path_key();
        if ordered.contains_key(&key) {
            tracing::warn!(path = %key, "duplicate path in first shelveset, keeping the first");
            continue;
        }

        // the same shelveset pairs each change with itself
        let counterpart = if same_shelveset {
            second_changes.get(pairing.first)
        } else {
            pairing.second.map(|j| &second_changes[j])
        };

        let entry = match counterpart {
            Some(counterpart) => {
                let same = if same_shelveset {
                    !change.is_delete() && !counterpart.is_delete()
                } else {
                    shelved_contents_equal(backend, change, counterpart)?
                };
                common += 1;
                if same {
                    same_content += 1;
                }
                ComparisonEntry::paired(change.clone(), counterpart.clone(), same)
            }
            None => ComparisonEntry::first_only(change.clone()),
        };
        tracing::debug!(
            path = %key,
            classification = entry.classification().as_str(),
            "classified"
        );
        ordered.insert(key, entry);
    }

    for &j in &correspondence.second_only {
        let change: &PendingChange = &second_changes[j];
        tracing::debug!(path = %change.path_key(), "only in second shelveset");
        ordered.insert(
            change.path_key(),
            ComparisonEntry::second_only(change.clone()),
        );
    }

    let entries: Vec<ComparisonEntry> = ordered.into_values().collect();

    let (total, matching, different, summary) = if same_shelveset {
        let count = first_changes.len();
        (count, count, 0, SAME_SHELVESET_MESSAGE.to_string())
    } else {
        let different = entries.len() - same_content;
        (
            common,
            same_content,
            different,
            summary_message(common, same_content, different),
        )
    };

    Ok(DiffResult {
        first_name: first.name.clone(),
        second_name: second.name.clone(),
        entries,
        total,
        matching,
        different,
        summary,
    })
}
