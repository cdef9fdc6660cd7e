use super::aligner::RawOp;
use super::{BlockKind, EditBlock, Ordinal};

/// Collapse a raw edit script into contiguous blocks.
///
/// A maximal run of keeps becomes one `Keep`. A maximal run of inserts and
/// deletes becomes a single `Replace` when it holds both (deleted tokens form
/// the old side, inserted tokens the new side, each in relative order), or an
/// `Add` / `Delete` when it holds only one kind. Ordinals are handed out to
/// non-keep blocks in emission order.
pub fn group(ops: &[RawOp<'_>]) -> Vec<EditBlock> {
    let mut blocks = Vec::new();
    let mut next_ordinal = 0;
    let mut k = 0;

    while k < ops.len() {
        if let RawOp::Keep(_) = ops[k] {
            let mut keeps = Vec::new();
            while let Some(RawOp::Keep(token)) = ops.get(k) {
                keeps.push(*token);
                k += 1;
            }
            blocks.push(EditBlock::keep(keeps.join(" ")));
            continue;
        }

        let mut deletes = Vec::new();
        let mut inserts = Vec::new();
        while let Some(op) = ops.get(k) {
            match op {
                RawOp::Delete(token) => deletes.push(*token),
                RawOp::Insert(token) => inserts.push(*token),
                RawOp::Keep(_) => break,
            }
            k += 1;
        }

        let kind = match (deletes.is_empty(), inserts.is_empty()) {
            (false, false) => BlockKind::Replace {
                old: deletes.join(" "),
                new: inserts.join(" "),
            },
            (false, true) => BlockKind::Delete {
                text: deletes.join(" "),
            },
            (true, _) => BlockKind::Add {
                text: inserts.join(" "),
            },
        };
        blocks.push(EditBlock::change(kind, Ordinal(next_ordinal)));
        next_ordinal += 1;
    }

    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interleaved_run_becomes_one_replace() {
        let ops = [
            RawOp::Delete("A"),
            RawOp::Insert("X"),
            RawOp::Delete("B"),
            RawOp::Insert("Y"),
        ];
        let blocks = group(&ops);
        assert_eq!(blocks.len(), 1);
        assert_eq!(
            blocks[0].kind(),
            &BlockKind::Replace {
                old: "A B".to_string(),
                new: "X Y".to_string()
            }
        );
        assert_eq!(blocks[0].ordinal(), Some(Ordinal(0)));
    }

    #[test]
    fn test_keep_runs_are_joined() {
        let ops = [
            RawOp::Keep("a"),
            RawOp::Keep("b"),
            RawOp::Insert("c"),
            RawOp::Keep("d"),
            RawOp::Delete("e"),
        ];
        let blocks = group(&ops);
        let kinds: Vec<_> = blocks.iter().map(|b| b.kind().clone()).collect();
        assert_eq!(
            kinds,
            vec![
                BlockKind::Keep {
                    text: "a b".to_string()
                },
                BlockKind::Add {
                    text: "c".to_string()
                },
                BlockKind::Keep {
                    text: "d".to_string()
                },
                BlockKind::Delete {
                    text: "e".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_ordinals_skip_keep_blocks() {
        let ops = [
            RawOp::Delete("x"),
            RawOp::Keep("a"),
            RawOp::Insert("y"),
            RawOp::Keep("b"),
            RawOp::Delete("z"),
            RawOp::Insert("w"),
        ];
        let ordinals: Vec<_> = group(&ops).iter().map(|b| b.ordinal()).collect();
        assert_eq!(
            ordinals,
            vec![Some(Ordinal(0)), None, Some(Ordinal(1)), None, Some(Ordinal(2))]
        );
    }

    #[test]
    fn test_empty_script() {
        assert!(group(&[]).is_empty());
    }
}
