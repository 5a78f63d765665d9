//! Testing utilities and mock implementations.
//!
//! This module provides a mock [`Engine`](crate::engine::Engine) and canned
//! diagnostic logs, allowing end-to-end tests of the parser and of engine
//! consumers without an ffmpeg binary.
//!
//! # Example
//!
//! ```rust,ignore
//! use ffstream_core::testing::{fixtures, MockEngine};
//!
//! let engine = MockEngine::new();
//! engine.set_script(fixtures::TRANSCODE_LOG).await;
//! engine.set_exit_code(0).await;
//! ```

mod mock_engine;

pub use mock_engine::MockEngine;

/// Diagnostic logs as the engine prints them.
pub mod fixtures {
    /// Video + audio transcode: banner, one input with container and stream
    /// metadata, stream mapping, then carriage-return status lines.
    pub const TRANSCODE_LOG: &str = concat!(
        "ffmpeg version 6.0 Copyright (c) 2000-2023 the FFmpeg developers\n",
        "  built with gcc 12.2.0 (Debian 12.2.0-14)\n",
        "  configuration: --enable-gpl --enable-libx264 --enable-libvpx\n",
        "  libavutil      58.  2.100 / 58.  2.100\n",
        "Input #0, mov,mp4,m4a,3gp,3g2,mj2, from 'input.mp4':\n",
        "  Metadata:\n",
        "    major_brand     : isom\n",
        "    minor_version   : 512\n",
        "    compatible_brands: isomiso2avc1mp41\n",
        "    encoder         : Lavf58.76.100\n",
        "  Duration: 00:00:10.00, start: 0.000000, bitrate: 2183 kb/s\n",
        "  Stream #0:0[0x1](und): Video: h264 (High) (avc1 / 0x31637661), yuv420p(progressive), 1280x720 [SAR 1:1 DAR 16:9], 2048 kb/s, 30 fps, 30 tbr, 15360 tbn (default)\n",
        "    Metadata:\n",
        "      handler_name    : VideoHandler\n",
        "      vendor_id       : [0][0][0][0]\n",
        "  Stream #0:1[0x2](und): Audio: aac (LC) (mp4a / 0x6134706D), 44100 Hz, stereo, fltp, 128 kb/s (default)\n",
        "    Metadata:\n",
        "      handler_name    : SoundHandler\n",
        "      vendor_id       : [0][0][0][0]\n",
        "Stream mapping:\n",
        "  Stream #0:0 -> #0:0 (h264 (native) -> vp9 (libvpx-vp9))\n",
        "  Stream #0:1 -> #0:1 (aac (native) -> opus (libopus))\n",
        "Press [q] to stop, [?] for help\n",
        "Output #0, webm, to 'output.webm':\n",
        "  Metadata:\n",
        "    encoder         : Lavf60.3.100\n",
        "  Stream #0:0(und): Video: vp9, yuv420p(tv, progressive), 1280x720, q=2-31, 30 fps, 1k tbn (default)\n",
        "frame=   75 fps= 25 q=30.0 size=     256kB time=00:00:02.50 bitrate= 838.9kbits/s speed=0.83x\r",
        "frame=  150 fps= 25 q=30.0 size=     512kB time=00:00:05.00 bitrate= 838.9kbits/s speed=0.83x\r",
        "frame=  300 fps= 25 q=-1.0 Lsize=    1024kB time=00:00:10.00 bitrate= 838.9kbits/s speed=0.83x\n",
        "video:900kB audio:110kB subtitle:0kB other streams:0kB global headers:0kB muxing overhead: 1.3%\n",
    );

    /// Audio piped through stdin and stdout, with the output described before
    /// the stream mapping and no known input duration.
    pub const AUDIO_LOG: &str = concat!(
        "Input #0, wav, from 'pipe:0':\n",
        "  Duration: N/A, bitrate: 1411 kb/s\n",
        "  Stream #0:0: Audio: pcm_s16le ([1][0][0][0] / 0x0001), 44100 Hz, 2 channels, s16, 1411 kb/s\n",
        "Output #0, mp3, to 'pipe:1':\n",
        "  Metadata:\n",
        "    TSSE            : Lavf60.3.100\n",
        "  Stream #0:0: Audio: mp3, 44100 Hz, stereo, fltp\n",
        "Stream mapping:\n",
        "  Stream #0:0 -> #0:0 (pcm_s16le (native) -> mp3 (libmp3lame))\n",
        "size=     128kB time=00:00:08.00 bitrate= 131.1kbits/s speed=16x\r",
        "size=     256kB time=00:00:16.00 bitrate= 131.1kbits/s speed=16x\r",
    );

    /// The engine gives up before describing any input.
    pub const MISSING_INPUT_LOG: &str = concat!(
        "ffmpeg version 6.0 Copyright (c) 2000-2023 the FFmpeg developers\n",
        "missing.mp4: No such file or directory\n",
    );

    /// Header cut off before the stream mapping, as when the engine is killed.
    pub const TRUNCATED_LOG: &str = concat!(
        "Input #0, matroska,webm, from 'input.mkv':\n",
        "  Duration: 01:30:00.50, start: 0.000000, bitrate: 5000 kb/s\n",
        "  Stream #0:0: Video: hevc (Main 10), yuv420p10le(tv), 3840x2160, 23.98 fps, 23.98 tbr, 1k tbn\n",
        "  Stream #0:1(eng): Audio: eac3, 48000 Hz, 5.1(side), fltp, 640 kb/s",
    );
}
