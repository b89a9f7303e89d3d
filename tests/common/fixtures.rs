//! A fake `yt-dlp` executable and downloaders wired to it

use media_dl::{Config, MediaDownloader};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// URL the fake tool fails on
pub const FAILING_URL: &str = "https://example.com/watch?v=fail";

/// URL the fake tool never finishes
pub const SLOW_URL: &str = "https://example.com/watch?v=slow";

/// URL the fake tool completes
pub const GOOD_URL: &str = "https://example.com/watch?v=good";

/// Shell script mimicking the output contract of yt-dlp
///
/// The behavior is picked from the last argument (the URL). Successful
/// downloads write `clip.mp3` next to the `-o` template.
const FAKE_YTDLP: &str = r#"#!/bin/sh
out=""
prev=""
probe=""
for arg; do
    if [ "$prev" = "-o" ]; then out="$arg"; fi
    case "$arg" in
        --dump-json) probe="json" ;;
        --list-formats) probe="formats" ;;
    esac
    prev="$arg"
    url="$arg"
done

case "$url" in
    *fail*)
        echo "ERROR: [generic] Unsupported URL: $url" >&2
        exit 2
        ;;
    *slow*)
        echo "[download]   1.0% of 10.00MiB at 1.00MiB/s ETA 00:09"
        exec sleep 30
        ;;
esac

if [ "$probe" = "json" ]; then
    echo '{"id":"good","title":"Fake Clip","duration":4.0,"extractor":"generic"}'
    exit 0
fi

if [ "$probe" = "formats" ]; then
    echo "[info] Available formats for good:"
    echo "ID  EXT  RESOLUTION | FILESIZE"
    echo "----------------------------"
    echo "140 m4a  audio only |  3.1MiB"
    echo "18  mp4  640x360    |  9.0MiB"
    exit 0
fi

dir=$(dirname "$out")
echo "[download] Destination: $dir/clip.mp3"
printf '[download]  10.0%% of 1.00KiB\r[download]  55.5%% of 1.00KiB\n'
echo "[download] 100.0% of 1.00KiB in 00:00"
echo "fake audio" > "$dir/clip.mp3"
exit 0
"#;

/// Write the fake tool into `dir` and return its path
pub fn write_fake_ytdlp(dir: &Path) -> PathBuf {
    let path = dir.join("yt-dlp");
    std::fs::write(&path, FAKE_YTDLP).expect("write fake tool");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
        .expect("make fake tool executable");
    path
}

/// Config pointing at the fake tool and a download dir inside `temp_dir`
pub fn fake_tool_config(temp_dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.download.download_dir = temp_dir.path().join("downloads");
    config.tools.ytdlp_path = Some(write_fake_ytdlp(temp_dir.path()));
    config.tools.search_path = false;
    config
}

/// A downloader driving the fake tool
pub async fn create_fake_tool_downloader() -> (MediaDownloader, TempDir) {
    let temp_dir = tempfile::tempdir().expect("create temp dir");
    let config = fake_tool_config(&temp_dir);
    let downloader = MediaDownloader::new(config)
        .await
        .expect("create downloader");
    (downloader, temp_dir)
}
