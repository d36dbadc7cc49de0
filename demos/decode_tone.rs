// This example synthesizes a stereo 16-bit tone as raw PCM bytes, loads it
// into a sample buffer and encodes it back out as native 32-bit float.
//
// This version showcases converting the sample rate during load.

use symphonium_samples::{
    encode, Encoding, Endian, PcmFormat, PcmLoader, SampleBufferF32, SampleBufferRead,
};

const SOURCE_SAMPLE_RATE: f64 = 44100.0;
const FREQUENCY: f64 = 440.0;
const SECONDS: f64 = 1.0;

pub fn main() {
    simple_log::quick!("info");

    let args: Vec<String> = std::env::args().collect();
    let target_sample_rate: f64 = match args.get(1) {
        Some(arg) => match arg.parse() {
            Ok(rate) => rate,
            Err(_) => {
                println!("usage: cargo run --example decode_tone [target-sample-rate]\ne.g. cargo run --example decode_tone 48000");
                return;
            }
        },
        None => 48000.0,
    };

    // Left channel carries the tone, right channel the tone inverted.
    let frames = (SOURCE_SAMPLE_RATE * SECONDS) as usize;
    let mut bytes = Vec::with_capacity(frames * 4);
    for i in 0..frames {
        let t = i as f64 / SOURCE_SAMPLE_RATE;
        let s = ((std::f64::consts::TAU * FREQUENCY * t).sin() * 0.5 * 32767.0) as i16;
        bytes.extend_from_slice(&s.to_le_bytes());
        bytes.extend_from_slice(&(-s).to_le_bytes());
    }

    let format = PcmFormat::new(16, Encoding::Signed, Endian::Little, 2, SOURCE_SAMPLE_RATE);

    let mut loader = PcmLoader::new();
    let buffer = loader
        .load(
            &bytes,
            &format,
            #[cfg(feature = "resampler")]
            Some(target_sample_rate),
            #[cfg(feature = "resampler")]
            symphonium_samples::ResampleQuality::Normal,
            SampleBufferF32::heap,
        )
        .unwrap();

    #[cfg(not(feature = "resampler"))]
    log::warn!(
        "Resampler feature disabled, keeping the source rate instead of {}",
        target_sample_rate
    );

    log::info!(
        "Loaded {} frames of {} channels at {} Hz",
        buffer.frames(),
        buffer.channels(),
        buffer.sample_rate()
    );

    let mut peak: f64 = 0.0;
    let mut frame = [0.0; 2];
    for i in 0..buffer.frames() {
        buffer.frame_get_exact(i, &mut frame).unwrap();
        peak = peak.max(frame[0].abs()).max(frame[1].abs());
    }
    log::info!("Peak level: {:.4}", peak);

    let encoded = encode(&buffer).unwrap();
    log::info!(
        "Encoded {} bytes as {}-bit {:?} ({:?} endian), {} frames",
        encoded.data.len(),
        encoded.format.bits_per_sample,
        encoded.format.encoding,
        encoded.format.endian,
        encoded.frames().unwrap()
    );
}
