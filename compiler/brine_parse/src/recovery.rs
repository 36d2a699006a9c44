//! Error recovery for the parser.
//!
//! After a syntax error the parser skips ahead to a token where parsing can
//! resume, so one mistake produces one diagnostic instead of a cascade.

use brine_ir::TokenKind;

use crate::cursor::Cursor;

/// Where to stop skipping.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RecoverySet {
    /// The start of the next declaration or top-level statement.
    ItemBoundary,
    /// The end of the current statement inside a block.
    StmtBoundary,
}

impl RecoverySet {
    fn stops_at(self, kind: &TokenKind) -> bool {
        match self {
            RecoverySet::ItemBoundary => matches!(
                kind,
                TokenKind::Using
                    | TokenKind::Fn
                    | TokenKind::Method
                    | TokenKind::Operator
                    | TokenKind::Extern
                    | TokenKind::Struct
                    | TokenKind::Alias
                    | TokenKind::Let
                    | TokenKind::Eof
            ),
            RecoverySet::StmtBoundary => matches!(
                kind,
                TokenKind::RBrace
                    | TokenKind::Let
                    | TokenKind::Return
                    | TokenKind::While
                    | TokenKind::Break
                    | TokenKind::Eof
            ),
        }
    }
}

/// Skip tokens until one in `set` is reached.
///
/// A `;` ends the skipped region and is consumed. Balanced `{ }` groups are
/// skipped whole when recovering to an item boundary, so a broken function
/// body does not leave its statements behind as top-level code.
pub fn synchronize(cursor: &mut Cursor<'_>, set: RecoverySet) {
    let mut depth = 0usize;
    while !cursor.is_at_end() {
        let kind = cursor.current_kind();
        if depth == 0 {
            if matches!(kind, TokenKind::Semicolon) {
                cursor.advance();
                return;
            }
            if set.stops_at(kind) {
                return;
            }
        }
        match kind {
            TokenKind::LBrace if set == RecoverySet::ItemBoundary => depth += 1,
            TokenKind::RBrace if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    cursor.advance();
                    return;
                }
            }
            _ => {}
        }
        cursor.advance();
    }
}
