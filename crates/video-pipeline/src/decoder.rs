use std::ffi::c_void;
use std::ptr;

use crate::Error;

/// A decoded YUV420 frame converted to interleaved RGB8.
pub struct DecodedFrame {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
}

/// Thin safe wrapper around libvpx's VP8 decoder (via `vpx-sys`). The
/// decoder is reset (dropped and recreated) whenever the pipeline detects
/// too many consecutive P-frame errors, since libvpx decoder state is
/// otherwise assumed corrupt past that point.
pub struct Vp8Decoder {
    ctx: vpx_sys::vpx_codec_ctx_t,
}

impl Vp8Decoder {
    pub fn new() -> Result<Self, Error> {
        let mut ctx: vpx_sys::vpx_codec_ctx_t = unsafe { std::mem::zeroed() };
        let cfg = vpx_sys::vpx_codec_dec_cfg_t {
            threads: 1,
            w: 0,
            h: 0,
        };

        let rc = unsafe {
            vpx_sys::vpx_codec_dec_init_ver(
                &mut ctx,
                vpx_sys::vpx_codec_vp8_dx(),
                &cfg,
                0,
                vpx_sys::VPX_DECODER_ABI_VERSION as i32,
            )
        };

        if rc != vpx_sys::vpx_codec_err_t::VPX_CODEC_OK {
            return Err(Error::DecoderInit(format!("vpx_codec_dec_init_ver failed: {rc:?}")));
        }

        Ok(Self { ctx })
    }

    /// Decodes one VP8 frame (already reassembled from RTP fragments).
    /// Returns every image the decoder yields for this frame, ordinarily
    /// exactly one.
    pub fn decode(&mut self, frame_data: &[u8]) -> Result<Vec<DecodedFrame>, Error> {
        let rc = unsafe {
            vpx_sys::vpx_codec_decode(
                &mut self.ctx,
                frame_data.as_ptr(),
                frame_data.len() as u32,
                ptr::null_mut::<c_void>(),
                0,
            )
        };

        if rc != vpx_sys::vpx_codec_err_t::VPX_CODEC_OK {
            return Err(Error::Decode(format!("vpx_codec_decode failed: {rc:?}")));
        }

        let mut frames = Vec::new();
        let mut iter: vpx_sys::vpx_codec_iter_t = ptr::null();

        loop {
            let image = unsafe { vpx_sys::vpx_codec_get_frame(&mut self.ctx, &mut iter) };
            if image.is_null() {
                break;
            }

            frames.push(unsafe { image_to_rgb(&*image) });
        }

        Ok(frames)
    }
}

impl Drop for Vp8Decoder {
    fn drop(&mut self) {
        unsafe {
            vpx_sys::vpx_codec_destroy(&mut self.ctx);
        }
    }
}

/// Converts a planar I420 `vpx_image_t` to interleaved RGB8 (BT.601).
unsafe fn image_to_rgb(image: &vpx_sys::vpx_image_t) -> DecodedFrame {
    let width = image.d_w;
    let height = image.d_h;

    let y_plane = image.planes[0];
    let u_plane = image.planes[1];
    let v_plane = image.planes[2];
    let y_stride = image.stride[0] as usize;
    let u_stride = image.stride[1] as usize;
    let v_stride = image.stride[2] as usize;

    let mut rgb = vec![0u8; (width * height * 3) as usize];

    for row in 0..height as usize {
        for col in 0..width as usize {
            let y = *y_plane.add(row * y_stride + col) as f32;
            let u = *u_plane.add((row / 2) * u_stride + col / 2) as f32 - 128.0;
            let v = *v_plane.add((row / 2) * v_stride + col / 2) as f32 - 128.0;

            let r = (y + 1.402 * v).clamp(0.0, 255.0) as u8;
            let g = (y - 0.344136 * u - 0.714136 * v).clamp(0.0, 255.0) as u8;
            let b = (y + 1.772 * u).clamp(0.0, 255.0) as u8;

            let idx = (row * width as usize + col) * 3;
            rgb[idx] = r;
            rgb[idx + 1] = g;
            rgb[idx + 2] = b;
        }
    }

    DecodedFrame {
        width,
        height,
        rgb,
    }
}
