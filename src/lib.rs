// Library root
// -----------
// Everything the `opml-import` binary needs, split so the import loop can
// be exercised without a terminal or a live server.
//
// Module responsibilities:
// - `opml`: parses the outline file and walks body -> folder -> feed.
// - `api`: blocking client for the reader service (ClientLogin, quickadd,
//   subscription edit).
// - `importer`: replays outline entries through the client.
// - `ui`: password prompt and progress spinner.
// - `logging`: tracing subscriber setup.
pub mod api;
pub mod importer;
pub mod logging;
pub mod opml;
pub mod ui;
