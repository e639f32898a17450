use {
    crate::publisher::LatestSnapshot,
    ratatui::{backend::CrosstermBackend, Terminal},
    std::time::Duration,
};

/// Run the TUI event loop.
///
/// Redraws from the shared latest-snapshot cell on a fixed cadence and
/// handles keyboard input; 'q' or Esc quits, which the caller treats as a
/// cancellation signal for the whole process.
pub async fn run_ui(latest: LatestSnapshot) -> Result<(), Box<dyn std::error::Error>> {
    // Setup terminal
    let stdout = std::io::stdout();
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Enable raw mode for keyboard input
    crossterm::terminal::enable_raw_mode()?;

    // Alternate screen isolates the dashboard from stderr logs
    crossterm::execute!(
        std::io::stdout(),
        crossterm::terminal::EnterAlternateScreen,
        crossterm::cursor::Hide
    )?;

    terminal.clear()?;

    let refresh_interval = Duration::from_millis(250);

    loop {
        // Check for keyboard input (non-blocking beyond the poll timeout)
        if crossterm::event::poll(refresh_interval)? {
            if let crossterm::event::Event::Key(key) = crossterm::event::read()? {
                match key.code {
                    crossterm::event::KeyCode::Char('q') | crossterm::event::KeyCode::Esc => {
                        break;
                    }
                    _ => {}
                }
            }
        }

        // Render the latest snapshot (cloned out so the lock is held briefly)
        let snapshot = { latest.read().await.clone() };
        terminal.draw(|f| {
            let area = f.size();
            crate::ui::layout::render_layout(f, area, snapshot.as_ref());
        })?;
    }

    // Cleanup - restore terminal state
    crossterm::execute!(
        std::io::stdout(),
        crossterm::terminal::LeaveAlternateScreen,
        crossterm::cursor::Show
    )?;
    crossterm::terminal::disable_raw_mode()?;
    Ok(())
}
