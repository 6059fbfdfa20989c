/// Aligns a value to 4-byte boundary.
pub(crate) fn align_stride(n: usize) -> usize {
    (n + 3) & !3
}

/// Adds stride padding to tightly packed pixel data.
pub(crate) fn add_stride_padding(
    src: Vec<u8>,
    row_bytes: usize,
    height: usize,
    stride: usize,
) -> Vec<u8> {
    if row_bytes == stride {
        return src;
    }

    let mut padded = vec![0; stride * height];
    for y in 0..height {
        padded[y * stride..y * stride + row_bytes]
            .copy_from_slice(&src[y * row_bytes..(y + 1) * row_bytes]);
    }
    padded
}

/// Strips stride padding, returning tightly packed pixel data.
pub(crate) fn strip_stride_padding(
    src: &[u8],
    row_bytes: usize,
    height: usize,
    stride: usize,
) -> Vec<u8> {
    if row_bytes == stride {
        return src[..row_bytes * height].to_vec();
    }

    let mut packed = Vec::with_capacity(row_bytes * height);
    for y in 0..height {
        packed.extend_from_slice(&src[y * stride..y * stride + row_bytes]);
    }
    packed
}
