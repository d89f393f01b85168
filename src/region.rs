use crate::buffer::{check_span, SampleMatrix};
use crate::error::EditResult;

pub fn mute(buf: &mut SampleMatrix, start: usize, len: usize) -> EditResult<()> {
    check_span(buf, start, len)?;
    for ch in buf.channels_mut() {
        ch[start..start + len].fill(0.0);
    }
    Ok(())
}

/// Linear ramp from silence at the first sample to unity at the last.
/// Spans of one sample or less are left untouched.
pub fn fade_in(buf: &mut SampleMatrix, start: usize, len: usize) -> EditResult<()> {
    check_span(buf, start, len)?;
    if len <= 1 {
        return Ok(());
    }
    let denom = (len - 1) as f32;
    for ch in buf.channels_mut() {
        for (i, v) in ch[start..start + len].iter_mut().enumerate() {
            *v *= i as f32 / denom;
        }
    }
    Ok(())
}

/// Mirror of [`fade_in`]: unity at the first sample, silence at the last.
pub fn fade_out(buf: &mut SampleMatrix, start: usize, len: usize) -> EditResult<()> {
    check_span(buf, start, len)?;
    if len <= 1 {
        return Ok(());
    }
    let denom = (len - 1) as f32;
    for ch in buf.channels_mut() {
        for (i, v) in ch[start..start + len].iter_mut().enumerate() {
            *v *= 1.0 - i as f32 / denom;
        }
    }
    Ok(())
}

pub fn gain(buf: &mut SampleMatrix, start: usize, len: usize, factor: f32) -> EditResult<()> {
    check_span(buf, start, len)?;
    for ch in buf.channels_mut() {
        for v in ch[start..start + len].iter_mut() {
            *v *= factor;
        }
    }
    Ok(())
}

/// Remove `len` samples at `start`, shifting the tail left.
pub fn delete_region(buf: &mut SampleMatrix, start: usize, len: usize) -> EditResult<()> {
    check_span(buf, start, len)?;
    for ch in buf.channels_mut() {
        ch.drain(start..start + len);
    }
    Ok(())
}

/// Open a gap of `insert.num_samples()` at `start` and copy `insert` into it.
///
/// Channels missing from `insert` are filled with silence; surplus channels
/// in `insert` are ignored. `start == num_samples()` appends.
pub fn insert_region(buf: &mut SampleMatrix, insert: &SampleMatrix, start: usize) -> EditResult<()> {
    check_span(buf, start, 0)?;
    let insert_len = insert.num_samples();
    if insert_len == 0 {
        return Ok(());
    }
    for (ci, ch) in buf.channels_mut().enumerate() {
        if ci < insert.num_channels() {
            ch.splice(start..start, insert.channel(ci).iter().copied());
        } else {
            ch.splice(start..start, std::iter::repeat(0.0).take(insert_len));
        }
    }
    Ok(())
}

/// Delete `len` samples at `start`, then insert `replace` there.
pub fn replace_region(
    buf: &mut SampleMatrix,
    replace: &SampleMatrix,
    start: usize,
    len: usize,
) -> EditResult<()> {
    check_span(buf, start, len)?;
    delete_region(buf, start, len)?;
    insert_region(buf, replace, start)
}

/// Write `src` over the buffer from `start`, growing the buffer when `src`
/// runs past the current end.
pub fn overwrite_region(buf: &mut SampleMatrix, src: &SampleMatrix, start: usize) -> EditResult<()> {
    check_span(buf, start, 0)?;
    let src_len = src.num_samples();
    let end = start + src_len;
    if end > buf.num_samples() {
        buf.resize(end);
    }
    for (ci, ch) in buf.channels_mut().enumerate() {
        if ci < src.num_channels() {
            ch[start..end].copy_from_slice(src.channel(ci));
        } else {
            ch[start..end].fill(0.0);
        }
    }
    Ok(())
}
