mod config;
mod downloader;
mod library;
mod player;
mod playlist;
mod playlists;
mod runtime;
mod ui;

fn main() -> anyhow::Result<()> {
    runtime::run()
}
