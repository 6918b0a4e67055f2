//! Board rendering: cell classification, score line, game-over overlay.

use crate::game::{Game, HEIGHT, WIDTH};
use crate::piece::Piece;
use crate::theme::{Shade, Theme};
use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

/// Two terminal columns per board cell keeps cells roughly square.
const CELL_WIDTH: u16 = 2;

/// What one board cell shows this frame. Priority: live piece at full
/// intensity, then the shadow's resting cell at half, then the trail between
/// piece and rest at a third, then whatever the board stores.
pub fn classify(game: &Game, shadow: &Piece, x: i32, y: i32) -> (u8, Shade) {
    let mut value = game.board.get(x, y);
    let mut piece_hit = false;
    let mut rest_hit = false;
    let mut trail_hit = false;
    for (bx, by) in game.piece.blocks() {
        if bx != x || by > y {
            continue;
        }
        let rest_y = by - game.piece.y + shadow.y;
        if by == y {
            piece_hit = true;
        } else if rest_y == y {
            rest_hit = true;
        } else if rest_y > y {
            trail_hit = true;
        } else {
            continue;
        }
        value = game.piece.kind.color_index();
    }
    let shade = if piece_hit {
        Shade::Full
    } else if rest_hit {
        Shade::Ghost
    } else if trail_hit {
        Shade::Trail
    } else {
        Shade::Full
    };
    (value, shade)
}

/// Draw the whole frame: score line, bordered board, game-over overlay.
/// Reads game state only.
pub fn draw(frame: &mut Frame, game: &Game, theme: &Theme) {
    let area = frame.area();
    let board_w = WIDTH as u16 * CELL_WIDTH + 2;
    let board_h = HEIGHT as u16 + 2;
    if area.width < board_w || area.height < board_h + 1 {
        frame.render_widget(
            Paragraph::new("terminal too small")
                .alignment(Alignment::Center)
                .style(Style::default().fg(theme.text)),
            area,
        );
        return;
    }

    let x = area.x + (area.width - board_w) / 2;
    let y = area.y + (area.height - board_h - 1) / 2;

    let score_rect = Rect {
        x,
        y,
        width: board_w,
        height: 1,
    };
    frame.render_widget(
        Paragraph::new(format!("{}", game.score)).style(Style::default().fg(theme.text)),
        score_rect,
    );

    let board_rect = Rect {
        x,
        y: y + 1,
        width: board_w,
        height: board_h,
    };
    let shadow = game.shadow_piece();
    let mut lines = Vec::with_capacity(HEIGHT as usize);
    for cy in 0..HEIGHT {
        let mut spans = Vec::with_capacity(WIDTH as usize);
        for cx in 0..WIDTH {
            let (value, shade) = classify(game, &shadow, cx, cy);
            spans.push(Span::styled(
                "  ",
                Style::default().bg(theme.cell_color(value, shade)),
            ));
        }
        lines.push(Line::from(spans));
    }
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border).bg(theme.bg));
    frame.render_widget(Paragraph::new(lines).block(block), board_rect);

    if game.game_over {
        let overlay = Rect {
            x: board_rect.x + 1,
            y: board_rect.y + board_rect.height / 2 - 1,
            width: board_rect.width - 2,
            height: 2,
        };
        frame.render_widget(
            Paragraph::new(vec![
                Line::from("Game Over!"),
                Line::from("drop to restart"),
            ])
            .alignment(Alignment::Center)
            .style(Style::default().fg(theme.text).bg(theme.bg)),
            overlay,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn live_piece_beats_shadow_and_board() {
        let game = Game::new(Instant::now());
        let shadow = game.shadow_piece();

        // Fresh game: L anchored at (5, 0), shadow resting at y = 20.
        assert_eq!(shadow.y, 20);
        assert_eq!(classify(&game, &shadow, 5, 0), (1, Shade::Full));
    }

    #[test]
    fn shadow_rest_is_half_intensity() {
        let game = Game::new(Instant::now());
        let shadow = game.shadow_piece();
        // The anchor's column, at its resting row.
        assert_eq!(classify(&game, &shadow, 5, 20), (1, Shade::Ghost));
    }

    #[test]
    fn trail_runs_between_piece_and_rest() {
        let game = Game::new(Instant::now());
        let shadow = game.shadow_piece();
        assert_eq!(classify(&game, &shadow, 5, 10), (1, Shade::Trail));
    }

    #[test]
    fn untouched_cells_show_the_board() {
        let mut game = Game::new(Instant::now());
        game.board.set(9, 21, 3);
        let shadow = game.shadow_piece();
        assert_eq!(classify(&game, &shadow, 9, 21), (3, Shade::Full));
        assert_eq!(classify(&game, &shadow, 0, 0), (0, Shade::Full));
    }
}
